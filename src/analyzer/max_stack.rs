//! Maximum evaluation stack depth of a method body.
//!
//! A single forward walk over the instructions. Branches and exception
//! handlers seed the depth of the instruction they lead to; a seed replaces
//! the carried-over depth when the walk reaches that instruction.
//!
//! Seeds from several branches are merged with a numeric max. Two paths
//! that reach the same instruction with different depths are not detected.

use super::stack_effect::{apply_intrinsic, call_delta};
use crate::cil::{
    CallSignature, Code, FlowControl, Instruction, InstructionId, MetadataResolver, MethodBody,
    TokenType,
};
use crate::utils::config::EXCEPTION_OBJECT_SLOTS;
use crate::utils::error::AnalysisError;
use log::{debug, trace, warn};
use std::collections::HashMap;

/// Compute the max stack of `body`
///
/// **Public** - main entry point for stack analysis
///
/// # Arguments
/// * `body` - Method body to analyze
/// * `resolver` - Resolves callee signatures of call-family instructions
///
/// # Returns
/// Smallest stack capacity the body can run with
///
/// # Errors
/// * `AnalysisError::Resolve` - resolver failed for a callee token
/// * `AnalysisError::Signature` - `calli` signature blob is malformed
/// * `AnalysisError::StackOverflow` - depth leaves the `i32` range
pub fn compute_max_stack<R: MetadataResolver + ?Sized>(
    body: &MethodBody,
    resolver: &R,
) -> Result<u32, AnalysisError> {
    MaxStackCalculator::new(body, resolver).compute()
}

/// Stack-depth walk over one method body
pub struct MaxStackCalculator<'a, R: ?Sized> {
    body: &'a MethodBody,
    resolver: &'a R,
    seeds: HashMap<InstructionId, i32>,
}

impl<'a, R: MetadataResolver + ?Sized> MaxStackCalculator<'a, R> {
    pub fn new(body: &'a MethodBody, resolver: &'a R) -> Self {
        Self {
            body,
            resolver,
            seeds: HashMap::new(),
        }
    }

    /// Run the walk and return the peak depth.
    ///
    /// Seeds from a previous run are discarded first.
    pub fn compute(&mut self) -> Result<u32, AnalysisError> {
        debug!(
            "Computing max stack over {} instructions, {} exception handlers",
            self.body.instructions.len(),
            self.body.exception_handlers.len()
        );

        let body = self.body;
        self.seeds.clear();
        self.seed_exception_handlers();

        let mut depth: i32 = 0;
        let mut max_depth: i32 = 0;

        for (id, instruction) in body.instructions.iter() {
            if let Some(seed) = self.seeds.get(&id) {
                depth = *seed;
            }

            max_depth = max_depth.max(depth);
            depth = self.next_depth(instruction, depth)?;
            max_depth = max_depth.max(depth);

            trace!(
                "IL_{:04x} {:<12} depth {}",
                instruction.offset(),
                instruction.code().name(),
                depth
            );

            self.propagate_to_targets(instruction, depth);

            if instruction.code().flow_control().is_terminator() {
                depth = 0;
            }
        }

        debug!("Max stack: {}", max_depth);
        Ok(max_depth as u32)
    }

    /// Seeded depth of an instruction after the last `compute`
    pub fn seed(&self, id: InstructionId) -> Option<i32> {
        self.seeds.get(&id).copied()
    }

    fn seed_exception_handlers(&mut self) {
        let body = self.body;
        for handler in &body.exception_handlers {
            for entry in handler.exception_entries() {
                self.seeds.insert(entry, EXCEPTION_OBJECT_SLOTS);
            }
        }
    }

    fn propagate_to_targets(&mut self, instruction: &Instruction, depth: i32) {
        if depth == 0 {
            return;
        }
        for target in instruction.branch_targets() {
            let seed = self.seeds.entry(*target).or_insert(depth);
            *seed = (*seed).max(depth);
        }
    }

    fn next_depth(&self, instruction: &Instruction, depth: i32) -> Result<i32, AnalysisError> {
        let opcode = instruction.opcode();
        let next = match opcode.flow_control {
            FlowControl::Call => {
                let signature = self.call_signature(instruction)?;
                i32::try_from(i64::from(depth) + call_delta(opcode.code, &signature)).ok()
            }
            _ => apply_intrinsic(&opcode, depth),
        };
        next.ok_or(AnalysisError::StackOverflow {
            offset: instruction.offset(),
        })
    }

    fn call_signature(&self, instruction: &Instruction) -> Result<CallSignature, AnalysisError> {
        let offset = instruction.offset();
        let token = instruction
            .token()
            .ok_or(AnalysisError::MissingCallToken { offset })?;

        if instruction.code() == Code::Calli {
            let blob = self
                .resolver
                .resolve_signature(token)
                .map_err(|source| AnalysisError::Resolve { offset, token, source })?;
            return CallSignature::parse(&blob)
                .map_err(|source| AnalysisError::Signature { offset, token, source });
        }

        if token.token_type() == Some(TokenType::MethodSpec) {
            // generic instantiations are resolved as whatever shape the resolver reports
            warn!(
                "Generic method call {} at IL_{:04x}: stack effect may be inexact",
                token, offset
            );
        }

        self.resolver
            .resolve_method(token)
            .map_err(|source| AnalysisError::Resolve { offset, token, source })
    }
}
