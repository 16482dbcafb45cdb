//! Metadata tokens.

use std::fmt;

/// Metadata table a token points into (high byte of the token)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Module,
    TypeRef,
    TypeDef,
    Field,
    Method,
    Param,
    MemberRef,
    Signature,
    TypeSpec,
    MethodSpec,
    String,
}

impl TokenType {
    pub fn from_table(table: u8) -> Option<TokenType> {
        match table {
            0x00 => Some(TokenType::Module),
            0x01 => Some(TokenType::TypeRef),
            0x02 => Some(TokenType::TypeDef),
            0x04 => Some(TokenType::Field),
            0x06 => Some(TokenType::Method),
            0x08 => Some(TokenType::Param),
            0x0A => Some(TokenType::MemberRef),
            0x11 => Some(TokenType::Signature),
            0x1B => Some(TokenType::TypeSpec),
            0x2B => Some(TokenType::MethodSpec),
            0x70 => Some(TokenType::String),
            _ => None,
        }
    }

    pub fn table(self) -> u8 {
        match self {
            TokenType::Module => 0x00,
            TokenType::TypeRef => 0x01,
            TokenType::TypeDef => 0x02,
            TokenType::Field => 0x04,
            TokenType::Method => 0x06,
            TokenType::Param => 0x08,
            TokenType::MemberRef => 0x0A,
            TokenType::Signature => 0x11,
            TokenType::TypeSpec => 0x1B,
            TokenType::MethodSpec => 0x2B,
            TokenType::String => 0x70,
        }
    }
}

/// A raw metadata token: table in the high byte, row id in the low 24 bits.
///
/// The all-zero token is the null token and never names a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataToken(u32);

impl MetadataToken {
    pub const NULL: MetadataToken = MetadataToken(0);

    pub const fn new(raw: u32) -> Self {
        MetadataToken(raw)
    }

    pub fn from_parts(table: TokenType, rid: u32) -> Self {
        MetadataToken(((table.table() as u32) << 24) | (rid & 0x00FF_FFFF))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn rid(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Table this token points into, if it is a known table
    pub fn token_type(self) -> Option<TokenType> {
        TokenType::from_table((self.0 >> 24) as u8)
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MetadataToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parts() {
        let token = MetadataToken::from_parts(TokenType::MethodSpec, 0x12);
        assert_eq!(token.raw(), 0x2B00_0012);
        assert_eq!(token.rid(), 0x12);
        assert_eq!(token.token_type(), Some(TokenType::MethodSpec));
        assert_eq!(token.to_string(), "0x2b000012");
    }

    #[test]
    fn test_null_token() {
        assert!(MetadataToken::NULL.is_null());
        assert!(!MetadataToken::new(0x0600_0001).is_null());
        assert_eq!(MetadataToken::new(0x4200_0001).token_type(), None);
    }
}
