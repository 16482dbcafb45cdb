//! Method bodies and exception handler regions.

use super::instruction::{InstructionId, InstructionSequence};
use super::signature::MetadataResolver;
use super::token::MetadataToken;
use crate::analyzer::compute_max_stack;
use crate::utils::error::AnalysisError;
use log::debug;
use std::fmt;

/// Kind of an exception handler clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Catch,
    Filter,
    Finally,
    Fault,
}

/// One exception handling clause of a method body
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionHandler {
    pub kind: HandlerKind,

    /// First protected instruction
    pub try_start: InstructionId,

    /// First instruction after the protected range (None = end of body)
    pub try_end: Option<InstructionId>,

    /// First instruction of the handler block
    pub handler_start: InstructionId,

    /// First instruction after the handler block (None = end of body)
    pub handler_end: Option<InstructionId>,

    /// First instruction of the filter block, for `Filter` handlers
    pub filter_start: Option<InstructionId>,

    /// Caught exception type, for `Catch` handlers
    pub catch_type: Option<MetadataToken>,
}

impl ExceptionHandler {
    /// Instructions entered with the exception object on the stack
    pub fn exception_entries(&self) -> impl Iterator<Item = InstructionId> {
        let entries = match self.kind {
            HandlerKind::Catch => [None, Some(self.handler_start)],
            HandlerKind::Filter => [self.filter_start, Some(self.handler_start)],
            HandlerKind::Finally | HandlerKind::Fault => [None, None],
        };
        entries.into_iter().flatten()
    }
}

/// Instructions, handlers and header data of one method
#[derive(Debug, Clone)]
pub struct MethodBody {
    pub instructions: InstructionSequence,
    pub exception_handlers: Vec<ExceptionHandler>,
    pub max_stack_size: u32,
    pub init_locals: bool,
    pub local_var_token: Option<MetadataToken>,

    /// Raw local variable signature blob
    pub variables_signature: Vec<u8>,
    pub variables_count: u32,
}

impl Default for MethodBody {
    fn default() -> Self {
        Self {
            instructions: InstructionSequence::new(),
            exception_handlers: Vec::new(),
            max_stack_size: 0,
            init_locals: true,
            local_var_token: None,
            variables_signature: Vec::new(),
            variables_count: 0,
        }
    }
}

impl MethodBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_exception_handlers(&self) -> bool {
        !self.exception_handlers.is_empty()
    }

    pub fn has_variables(&self) -> bool {
        self.variables_count > 0
    }

    /// Recompute `max_stack_size` from the current instructions.
    ///
    /// On error the previous value is kept untouched.
    pub fn recalculate_max_stack_size<R: MetadataResolver + ?Sized>(
        &mut self,
        resolver: &R,
    ) -> Result<u32, AnalysisError> {
        let max_stack = compute_max_stack(self, resolver)?;
        debug!(
            "max stack for {} instructions: {} -> {}",
            self.instructions.len(),
            self.max_stack_size,
            max_stack
        );
        self.max_stack_size = max_stack;
        Ok(max_stack)
    }
}

impl fmt::Display for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instructions:")?;
        for id in self.instructions.ids() {
            writeln!(f, "{}", self.instructions.display(*id))?;
        }
        writeln!(f)?;
        writeln!(f, "Exception handlers:")?;
        for handler in &self.exception_handlers {
            let label = |id: Option<InstructionId>| match id.and_then(|id| self.instructions.get(id)) {
                Some(instruction) => format!("IL_{:04x}", instruction.offset()),
                None => "end".to_string(),
            };
            write!(
                f,
                "{:?} try {}..{} handler {}..{}",
                handler.kind,
                label(Some(handler.try_start)),
                label(handler.try_end),
                label(Some(handler.handler_start)),
                label(handler.handler_end),
            )?;
            if let Some(filter) = handler.filter_start {
                write!(f, " filter {}", label(Some(filter)))?;
            }
            if let Some(catch_type) = handler.catch_type {
                write!(f, " catch {}", catch_type)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
