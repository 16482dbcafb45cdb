//! Evaluation stack analysis of method bodies.
//!
//! Instrumentation rewrites method bodies, so their declared max stack has
//! to be recomputed before the body is encoded again. This module provides:
//! - Stack effects of individual opcodes and calls
//! - The max-stack walk over a whole body

pub mod max_stack;
pub mod stack_effect;

// Re-export main types and functions
pub use max_stack::{compute_max_stack, MaxStackCalculator};
pub use stack_effect::{apply_intrinsic, call_delta, pop_effect, push_count, PopEffect};
