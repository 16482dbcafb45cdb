//! Error types for the entire library.
//!
//! We use `thiserror` for every error enum; each concern gets its own type
//! and wraps the lower-level one it depends on.

use crate::aggregator::CallHandle;
use crate::cil::{InstructionId, MetadataToken, OperandType};
use thiserror::Error;

/// Errors that can occur while building or editing an instruction sequence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstructionError {
    #[error("opcode {opcode} takes an {expected:?} operand, got {found}")]
    OperandMismatch {
        opcode: &'static str,
        expected: OperandType,
        found: &'static str,
    },

    #[error("opcode {0} requires an operand")]
    MissingOperand(&'static str),

    #[error("opcode {0} requires a non-null metadata token")]
    NullToken(&'static str),

    #[error("branch target {0} does not belong to this instruction sequence")]
    UnknownTarget(InstructionId),

    #[error("unknown instruction {0}")]
    UnknownInstruction(InstructionId),

    #[error("instruction {0} is already linked into the sequence")]
    AlreadyLinked(InstructionId),

    #[error("position {index} is out of range for {len} instructions")]
    OutOfRange { index: usize, len: usize },
}

/// Errors that can occur while parsing a signature blob
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature blob is empty")]
    Empty,

    #[error("signature blob truncated at byte {0}")]
    Truncated(usize),

    #[error("invalid compressed integer lead byte {lead:#04x} at byte {position}")]
    InvalidCompressedInteger { lead: u8, position: usize },

    #[error("calling convention {0:#04x} does not describe a method signature")]
    NotAMethodSignature(u8),

    #[error("unknown element type {element:#04x} at byte {position}")]
    UnknownElementType { element: u8, position: usize },

    #[error("type nesting too deep at byte {0}")]
    NestingTooDeep(usize),
}

/// Errors reported by a metadata resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("token {0} cannot be resolved")]
    UnknownToken(MetadataToken),

    #[error("token {0} points into the wrong metadata table")]
    WrongTable(MetadataToken),

    #[error("metadata resolution failed: {0}")]
    Other(String),
}

/// Errors that abort a max-stack computation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("call at IL_{offset:04x} has no metadata token operand")]
    MissingCallToken { offset: usize },

    #[error("failed to resolve callee {token} at IL_{offset:04x}: {source}")]
    Resolve {
        offset: usize,
        token: MetadataToken,
        source: ResolveError,
    },

    #[error("stack depth leaves the representable range at IL_{offset:04x}")]
    StackOverflow { offset: usize },

    #[error("malformed standalone signature {token} at IL_{offset:04x}: {source}")]
    Signature {
        offset: usize,
        token: MetadataToken,
        source: SignatureError,
    },
}

/// Errors that can occur while recording calls into a call tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("finish of {actual} does not match the active call {expected:?}")]
    NestingMismatch {
        expected: Option<CallHandle>,
        actual: CallHandle,
    },
}
