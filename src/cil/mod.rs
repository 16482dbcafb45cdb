//! In-memory model of CIL method bodies.
//!
//! This module provides:
//! - The opcode table with operand types, flow control and stack behaviour
//! - Metadata tokens
//! - An arena-backed, doubly linked instruction sequence
//! - Method bodies with exception handler regions
//! - Call signature shapes and the metadata resolver boundary

pub mod body;
pub mod instruction;
pub mod opcode;
pub mod signature;
pub mod token;

// Re-export main types
pub use body::{ExceptionHandler, HandlerKind, MethodBody};
pub use instruction::{Instruction, InstructionDisplay, InstructionId, InstructionSequence, Operand};
pub use opcode::{Code, FlowControl, OpCode, OperandType, StackPop, StackPush};
pub use signature::{CallSignature, MetadataResolver};
pub use token::{MetadataToken, TokenType};
