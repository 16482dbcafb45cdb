//! Call-tree nodes.
//!
//! Nodes live in an arena owned by the tree and refer to each other by
//! [`NodeId`]. Each node keeps its children in a [`HandleTable`] keyed by
//! the callee handle.

use super::handle_table::{CallHandle, HandleTable};
use super::method::MethodRef;
use crate::utils::error::TraceError;
use std::fmt;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One call path: a method reached through a fixed chain of callers
#[derive(Debug, Clone)]
pub struct MethodCallNode {
    parent: Option<NodeId>,
    handle: Option<CallHandle>,
    method: Option<MethodRef>,
    calls: u64,
    ticks: i64,
    children: HandleTable<NodeId>,
}

impl MethodCallNode {
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            handle: None,
            method: None,
            calls: 0,
            ticks: 0,
            children: HandleTable::new(),
        }
    }

    pub(crate) fn child(parent: NodeId, handle: CallHandle, method: &MethodRef) -> Self {
        Self {
            parent: Some(parent),
            handle: Some(handle),
            method: Some(method.clone()),
            ..Self::root()
        }
    }

    /// `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// `None` only for the root
    pub fn handle(&self) -> Option<CallHandle> {
        self.handle
    }

    pub fn method(&self) -> Option<&MethodRef> {
        self.method.as_ref()
    }

    /// Completed calls since the last clear
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Inclusive ticks since the last clear
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn children(&self) -> &HandleTable<NodeId> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut HandleTable<NodeId> {
        &mut self.children
    }

    /// Record one completed call of `handle` on this node.
    ///
    /// # Errors
    /// * `TraceError::NestingMismatch` - `handle` is not this node's callee
    pub(crate) fn finish(&mut self, handle: CallHandle, elapsed: i64) -> Result<(), TraceError> {
        if self.handle != Some(handle) {
            return Err(TraceError::NestingMismatch {
                expected: self.handle,
                actual: handle,
            });
        }
        self.calls += 1;
        self.ticks += elapsed;
        Ok(())
    }

    /// Zero the counters, keeping identity and child table
    pub(crate) fn clear(&mut self) {
        self.calls = 0;
        self.ticks = 0;
    }
}
