//! Call signatures and the metadata resolution boundary.
//!
//! The stack-depth analyzer only needs the shape of a callee's signature:
//! whether an implicit `this` is passed, how many parameters it takes and
//! whether it returns a value. Method tokens are resolved through a
//! [`MetadataResolver`] supplied by the caller. Standalone signatures (the
//! operand of `calli`) arrive as raw blob bytes and are parsed here.

use super::token::MetadataToken;
use crate::utils::config::{
    ELEMENT_TYPE_ARRAY, ELEMENT_TYPE_BYREF, ELEMENT_TYPE_CLASS, ELEMENT_TYPE_CMOD_OPT,
    ELEMENT_TYPE_CMOD_REQD, ELEMENT_TYPE_FNPTR, ELEMENT_TYPE_GENERICINST, ELEMENT_TYPE_I,
    ELEMENT_TYPE_MVAR, ELEMENT_TYPE_OBJECT, ELEMENT_TYPE_PINNED, ELEMENT_TYPE_PTR,
    ELEMENT_TYPE_SENTINEL, ELEMENT_TYPE_STRING, ELEMENT_TYPE_SZARRAY, ELEMENT_TYPE_TYPEDBYREF,
    ELEMENT_TYPE_U, ELEMENT_TYPE_VALUETYPE, ELEMENT_TYPE_VAR, ELEMENT_TYPE_VOID,
    MAX_SIGNATURE_NESTING, SIG_EXPLICITTHIS, SIG_GENERIC, SIG_HASTHIS, SIG_KIND_MASK,
    SIG_KIND_VARARG,
};
use crate::utils::error::{ResolveError, SignatureError};

/// Stack-relevant shape of a method signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallSignature {
    pub has_this: bool,
    pub explicit_this: bool,
    pub param_count: u32,
    pub has_return_value: bool,
}

impl CallSignature {
    /// Whether the caller pushes an implicit `this` argument
    pub fn pops_implicit_this(&self) -> bool {
        self.has_this && !self.explicit_this
    }

    /// Parse a method signature blob (ECMA-335 II.23.2.1-3).
    ///
    /// The return type and every parameter type are walked, so a blob that
    /// declares more parameters than it encodes is rejected. Bytes after
    /// the last parameter are ignored.
    ///
    /// # Errors
    /// * `SignatureError::Empty` - no bytes at all
    /// * `SignatureError::NotAMethodSignature` - field, local, property or
    ///   generic instantiation blob
    /// * `SignatureError::Truncated` - blob ends inside the signature
    /// * `SignatureError::InvalidCompressedInteger` - bad compressed integer
    /// * `SignatureError::UnknownElementType` - undefined type byte
    /// * `SignatureError::NestingTooDeep` - pathologically nested types
    pub fn parse(blob: &[u8]) -> Result<CallSignature, SignatureError> {
        if blob.is_empty() {
            return Err(SignatureError::Empty);
        }
        BlobReader::new(blob).read_method_signature(0)
    }
}

/// Cursor over a signature blob
struct BlobReader<'a> {
    blob: &'a [u8],
    position: usize,
}

impl<'a> BlobReader<'a> {
    fn new(blob: &'a [u8]) -> Self {
        Self { blob, position: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, SignatureError> {
        let byte = *self
            .blob
            .get(self.position)
            .ok_or(SignatureError::Truncated(self.position))?;
        self.position += 1;
        Ok(byte)
    }

    fn peek_u8(&self) -> Result<u8, SignatureError> {
        self.blob
            .get(self.position)
            .copied()
            .ok_or(SignatureError::Truncated(self.position))
    }

    /// ECMA-335 II.23.2 compressed unsigned integer
    fn read_compressed_u32(&mut self) -> Result<u32, SignatureError> {
        let start = self.position;
        let lead = self.read_u8()?;
        if lead & 0x80 == 0 {
            Ok(lead as u32)
        } else if lead & 0xC0 == 0x80 {
            let b1 = self.read_u8()?;
            Ok((((lead & 0x3F) as u32) << 8) | b1 as u32)
        } else if lead & 0xE0 == 0xC0 {
            let b1 = self.read_u8()?;
            let b2 = self.read_u8()?;
            let b3 = self.read_u8()?;
            Ok((((lead & 0x1F) as u32) << 24) | ((b1 as u32) << 16) | ((b2 as u32) << 8) | b3 as u32)
        } else {
            Err(SignatureError::InvalidCompressedInteger { lead, position: start })
        }
    }

    /// MethodDefSig / MethodRefSig / StandAloneMethodSig
    fn read_method_signature(&mut self, depth: usize) -> Result<CallSignature, SignatureError> {
        let calling_convention = self.read_u8()?;
        if calling_convention & SIG_KIND_MASK > SIG_KIND_VARARG {
            return Err(SignatureError::NotAMethodSignature(calling_convention));
        }

        if calling_convention & SIG_GENERIC != 0 {
            // generic parameter count
            self.read_compressed_u32()?;
        }
        let param_count = self.read_compressed_u32()?;

        self.skip_custom_modifiers()?;
        let has_return_value = if self.peek_u8()? == ELEMENT_TYPE_VOID {
            self.position += 1;
            false
        } else {
            self.skip_type(depth + 1)?;
            true
        };

        for _ in 0..param_count {
            // start of the vararg part, not a parameter itself
            if self.peek_u8()? == ELEMENT_TYPE_SENTINEL {
                self.position += 1;
            }
            self.skip_type(depth + 1)?;
        }

        Ok(CallSignature {
            has_this: calling_convention & SIG_HASTHIS != 0,
            explicit_this: calling_convention & SIG_EXPLICITTHIS != 0,
            param_count,
            has_return_value,
        })
    }

    fn skip_custom_modifiers(&mut self) -> Result<(), SignatureError> {
        while matches!(self.peek_u8()?, ELEMENT_TYPE_CMOD_REQD | ELEMENT_TYPE_CMOD_OPT) {
            self.position += 1;
            // TypeDefOrRefOrSpecEncoded
            self.read_compressed_u32()?;
        }
        Ok(())
    }

    /// Skip one encoded type (ECMA-335 II.23.2.12)
    fn skip_type(&mut self, depth: usize) -> Result<(), SignatureError> {
        let position = self.position;
        if depth > MAX_SIGNATURE_NESTING {
            return Err(SignatureError::NestingTooDeep(position));
        }

        let element = self.read_u8()?;
        match element {
            // VOID only appears behind PTR here
            ELEMENT_TYPE_VOID..=ELEMENT_TYPE_STRING
            | ELEMENT_TYPE_TYPEDBYREF
            | ELEMENT_TYPE_I
            | ELEMENT_TYPE_U
            | ELEMENT_TYPE_OBJECT => Ok(()),
            ELEMENT_TYPE_VALUETYPE | ELEMENT_TYPE_CLASS | ELEMENT_TYPE_VAR | ELEMENT_TYPE_MVAR => {
                self.read_compressed_u32().map(drop)
            }
            ELEMENT_TYPE_PTR | ELEMENT_TYPE_BYREF | ELEMENT_TYPE_SZARRAY | ELEMENT_TYPE_PINNED => {
                self.skip_type(depth + 1)
            }
            ELEMENT_TYPE_CMOD_REQD | ELEMENT_TYPE_CMOD_OPT => {
                self.read_compressed_u32()?;
                self.skip_type(depth + 1)
            }
            ELEMENT_TYPE_GENERICINST => {
                self.skip_type(depth + 1)?;
                let argument_count = self.read_compressed_u32()?;
                for _ in 0..argument_count {
                    self.skip_type(depth + 1)?;
                }
                Ok(())
            }
            ELEMENT_TYPE_ARRAY => {
                self.skip_type(depth + 1)?;
                // rank, then sizes and lower bounds, each count-prefixed
                self.read_compressed_u32()?;
                for _ in 0..2 {
                    let count = self.read_compressed_u32()?;
                    for _ in 0..count {
                        self.read_compressed_u32()?;
                    }
                }
                Ok(())
            }
            ELEMENT_TYPE_FNPTR => self.read_method_signature(depth + 1).map(drop),
            _ => Err(SignatureError::UnknownElementType { element, position }),
        }
    }
}

/// Metadata lookups the stack-depth analyzer depends on.
///
/// Implemented by whatever owns the module metadata (a loaded assembly, a
/// reflection bridge, a test fixture).
pub trait MetadataResolver {
    /// Signature shape of the method named by a `call`, `callvirt`,
    /// `newobj` or `jmp` token (MethodDef, MemberRef or MethodSpec).
    fn resolve_method(&self, token: MetadataToken) -> Result<CallSignature, ResolveError>;

    /// Raw blob of the standalone signature named by a `calli` token
    fn resolve_signature(&self, token: MetadataToken) -> Result<Vec<u8>, ResolveError>;
}

impl<T: MetadataResolver + ?Sized> MetadataResolver for &T {
    fn resolve_method(&self, token: MetadataToken) -> Result<CallSignature, ResolveError> {
        (**self).resolve_method(token)
    }

    fn resolve_signature(&self, token: MetadataToken) -> Result<Vec<u8>, ResolveError> {
        (**self).resolve_signature(token)
    }
}
