//! Constants shared across the crate.

/// Slot count of a freshly created child table
pub const INITIAL_CHILD_TABLE_LEN: usize = 1;

/// Stack slots occupied by the exception object on handler/filter entry
pub const EXCEPTION_OBJECT_SLOTS: i32 = 1;

/// Call count reported for time spent outside any traced call
pub const UNTRACKED_CALLS: u64 = 1;

/// Percent reported for the root of a tree snapshot
pub const ROOT_PERCENT: f64 = 100.0;

/// Separator between frames of a collapsed stack
pub const STACK_SEPARATOR: &str = ";";

/// High byte of every two-byte opcode
pub const TWO_BYTE_OPCODE_PREFIX: u8 = 0xFE;

// Calling convention byte of a method signature (ECMA-335 II.23.2.3)
pub const SIG_HASTHIS: u8 = 0x20;
pub const SIG_EXPLICITTHIS: u8 = 0x40;
pub const SIG_GENERIC: u8 = 0x10;
pub const SIG_KIND_MASK: u8 = 0x0F;
/// Highest calling convention kind that still describes a method
pub const SIG_KIND_VARARG: u8 = 0x05;

// Element types of signature blobs (ECMA-335 II.23.1.16)
pub const ELEMENT_TYPE_VOID: u8 = 0x01;
pub const ELEMENT_TYPE_STRING: u8 = 0x0E;
pub const ELEMENT_TYPE_PTR: u8 = 0x0F;
pub const ELEMENT_TYPE_BYREF: u8 = 0x10;
pub const ELEMENT_TYPE_VALUETYPE: u8 = 0x11;
pub const ELEMENT_TYPE_CLASS: u8 = 0x12;
pub const ELEMENT_TYPE_VAR: u8 = 0x13;
pub const ELEMENT_TYPE_ARRAY: u8 = 0x14;
pub const ELEMENT_TYPE_GENERICINST: u8 = 0x15;
pub const ELEMENT_TYPE_TYPEDBYREF: u8 = 0x16;
pub const ELEMENT_TYPE_I: u8 = 0x18;
pub const ELEMENT_TYPE_U: u8 = 0x19;
pub const ELEMENT_TYPE_FNPTR: u8 = 0x1B;
pub const ELEMENT_TYPE_OBJECT: u8 = 0x1C;
pub const ELEMENT_TYPE_SZARRAY: u8 = 0x1D;
pub const ELEMENT_TYPE_MVAR: u8 = 0x1E;
pub const ELEMENT_TYPE_CMOD_REQD: u8 = 0x1F;
pub const ELEMENT_TYPE_CMOD_OPT: u8 = 0x20;
pub const ELEMENT_TYPE_SENTINEL: u8 = 0x41;
pub const ELEMENT_TYPE_PINNED: u8 = 0x45;

/// Deepest type nesting accepted in a signature blob
pub const MAX_SIGNATURE_NESTING: usize = 64;
