//! Per-instruction stack effects.
//!
//! Non-call opcodes have a fixed effect given by their pop and push
//! behaviour. Call-family opcodes depend on the callee signature.

use crate::cil::{CallSignature, Code, OpCode, StackPop, StackPush};

/// What an opcode removes from the evaluation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopEffect {
    Count(i32),
    /// Empties the stack (`leave`)
    All,
    /// Depends on a signature or on the method's return type
    Variable,
}

pub fn pop_effect(pop: StackPop) -> PopEffect {
    match pop {
        StackPop::Pop0 => PopEffect::Count(0),
        StackPop::Pop1 | StackPop::PopI | StackPop::PopRef => PopEffect::Count(1),
        StackPop::Pop1Pop1
        | StackPop::PopIPop1
        | StackPop::PopIPopI
        | StackPop::PopIPopI8
        | StackPop::PopIPopR4
        | StackPop::PopIPopR8
        | StackPop::PopRefPop1
        | StackPop::PopRefPopI => PopEffect::Count(2),
        StackPop::PopIPopIPopI
        | StackPop::PopRefPopIPopI
        | StackPop::PopRefPopIPopI8
        | StackPop::PopRefPopIPopR4
        | StackPop::PopRefPopIPopR8
        | StackPop::PopRefPopIPopRef => PopEffect::Count(3),
        StackPop::PopAll => PopEffect::All,
        StackPop::VarPop => PopEffect::Variable,
    }
}

/// Values pushed; `VarPush` counts as none
pub fn push_count(push: StackPush) -> i32 {
    match push {
        StackPush::Push0 | StackPush::VarPush => 0,
        StackPush::Push1
        | StackPush::PushI
        | StackPush::PushI8
        | StackPush::PushR4
        | StackPush::PushR8
        | StackPush::PushRef => 1,
        StackPush::Push1Push1 => 2,
    }
}

/// Depth after a non-call opcode executes at `depth`.
///
/// Variable pops leave the depth alone: `ret` resets it anyway as a
/// terminator. `None` if the result does not fit an `i32`.
pub fn apply_intrinsic(opcode: &OpCode, depth: i32) -> Option<i32> {
    let popped = match pop_effect(opcode.pop) {
        PopEffect::Count(count) => depth.checked_sub(count)?,
        PopEffect::All => 0,
        PopEffect::Variable => depth,
    };
    popped.checked_add(push_count(opcode.push))
}

/// Net stack change of a call-family opcode with callee `signature`.
///
/// Widened to `i64` so that any `u32` parameter count fits.
pub fn call_delta(code: Code, signature: &CallSignature) -> i64 {
    let mut delta: i64 = 0;

    // `this` of a constructor is allocated by newobj, not passed in
    if signature.pops_implicit_this() && code != Code::Newobj {
        delta -= 1;
    }
    delta -= i64::from(signature.param_count);
    // function pointer
    if code == Code::Calli {
        delta -= 1;
    }
    if signature.has_return_value || code == Code::Newobj {
        delta += 1;
    }

    delta
}
