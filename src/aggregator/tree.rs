//! Per-thread call tree.
//!
//! The instrumentation layer reports every traced call as a start/finish
//! pair. The tree keeps a cursor at the active call; starting a method
//! moves the cursor to the child for that callee and finishing moves it
//! back to the caller. Calls reached through the same chain of callers
//! share a node, so counts and ticks aggregate per call path.

use super::clock::{StopwatchTicks, TickSource};
use super::handle_table::CallHandle;
use super::method::MethodRef;
use super::node::{MethodCallNode, NodeId};
use super::stats::{percent_of, MethodStats, MethodStatsNode};
use crate::utils::config::{ROOT_PERCENT, UNTRACKED_CALLS};
use crate::utils::error::TraceError;
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Call tree with a cursor at the active call
///
/// **Public** - one instance per traced thread
#[derive(Debug)]
pub struct MethodCallTree<C: TickSource = StopwatchTicks> {
    nodes: Vec<MethodCallNode>,
    current: NodeId,
    start_ticks: i64,
    clock: C,
}

impl MethodCallTree<StopwatchTicks> {
    pub fn new() -> Self {
        Self::with_clock(StopwatchTicks::new())
    }
}

impl Default for MethodCallTree<StopwatchTicks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TickSource> MethodCallTree<C> {
    /// Empty tree timed by `clock`; the start timestamp is read immediately
    pub fn with_clock(clock: C) -> Self {
        let start_ticks = clock.ticks();
        Self {
            nodes: vec![MethodCallNode::root()],
            current: NodeId(0),
            start_ticks,
            clock,
        }
    }

    /// Enter a call of `handle` from the active call
    ///
    /// **Public** - hot path, called on every traced method entry
    ///
    /// # Arguments
    /// * `handle` - Identity of the callee
    /// * `method` - Descriptive reference, stored only when the path is new
    ///
    /// # Returns
    /// The node now under the cursor
    pub fn start_method(&mut self, handle: CallHandle, method: &MethodRef) -> NodeId {
        let parent = self.current;
        let next = NodeId(self.nodes.len());
        let child = *self.nodes[parent.0]
            .children_mut()
            .get_or_insert_with(handle, || next);
        if child == next {
            self.nodes.push(MethodCallNode::child(parent, handle, method));
        }
        self.current = child;
        child
    }

    /// Leave the active call, crediting it with `elapsed` inclusive ticks
    ///
    /// **Public** - hot path, called on every traced method exit
    ///
    /// # Returns
    /// The caller's node, now under the cursor
    ///
    /// # Errors
    /// * `TraceError::NestingMismatch` - `handle` is not the active call.
    ///   Nothing is recorded and the cursor stays put.
    pub fn finish_method(&mut self, handle: CallHandle, elapsed: i64) -> Result<NodeId, TraceError> {
        let node = &mut self.nodes[self.current.0];
        node.finish(handle, elapsed)?;
        if let Some(parent) = node.parent() {
            self.current = parent;
        }
        Ok(self.current)
    }

    /// Hierarchical snapshot relative to `end_ticks`
    ///
    /// **Public** - ticks are inclusive, percentages are of the elapsed
    /// time since construction or the last clear. The root reports 100%.
    pub fn stats_as_tree(&self, end_ticks: i64) -> MethodStatsNode {
        let elapsed = end_ticks - self.start_ticks;
        let mut result = self.tree_stats(self.root(), elapsed);
        result.stats.percent = ROOT_PERCENT;
        result
    }

    /// Flat per-method snapshot relative to `end_ticks`
    ///
    /// **Public** - ticks are self ticks summed over every call path of a
    /// method; generic instantiations are merged into their definition.
    ///
    /// # Returns
    /// One entry per method plus an untracked entry (no method) holding the
    /// elapsed time not recorded by any traced call, sorted by descending
    /// ticks
    pub fn stats_as_list(&self, end_ticks: i64) -> Vec<MethodStats> {
        let elapsed = end_ticks - self.start_ticks;

        let mut by_method: HashMap<MethodRef, MethodStats> = HashMap::new();
        for child in self.children(self.root()) {
            self.flat_stats(child, &mut by_method);
        }

        let recorded: i64 = by_method.values().map(|stats| stats.ticks).sum();
        let mut result: Vec<MethodStats> = by_method.into_values().collect();
        result.push(MethodStats::new(None, UNTRACKED_CALLS, elapsed - recorded));

        result.sort_by(|a, b| b.ticks.cmp(&a.ticks).then_with(|| a.method.cmp(&b.method)));
        for stats in &mut result {
            stats.percent = percent_of(stats.ticks, elapsed);
        }

        debug!(
            "Flat snapshot: {} methods over {} ticks",
            result.len() - 1,
            elapsed
        );

        result
    }

    /// Tree snapshot at the clock's current reading
    pub fn snapshot_tree(&self) -> MethodStatsNode {
        self.stats_as_tree(self.clock.ticks())
    }

    /// Flat snapshot at the clock's current reading
    pub fn snapshot_list(&self) -> Vec<MethodStats> {
        self.stats_as_list(self.clock.ticks())
    }

    /// Zero every count and tick and restart the elapsed-time window.
    ///
    /// Nodes, handles and tables stay in place for the next trace.
    pub fn clear_stats(&mut self) {
        for node in &mut self.nodes {
            node.clear();
        }
        self.start_ticks = self.clock.ticks();
        debug!("Cleared stats of {} call paths", self.nodes.len() - 1);
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node under the cursor
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn is_at_root(&self) -> bool {
        self.current == self.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&MethodCallNode> {
        self.nodes.get(id.0)
    }

    /// Children of `id` that completed at least one call since the last
    /// clear, in table order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id.0)
            .into_iter()
            .flat_map(|node| node.children().iter().map(|(_, child)| *child))
            .filter(move |child| self.nodes[child.0].calls() > 0)
    }

    /// Handle held by each slot of the child table of `id`
    pub fn table_slots(&self, id: NodeId) -> Vec<Option<CallHandle>> {
        self.nodes
            .get(id.0)
            .map(|node| node.children().slots().collect())
            .unwrap_or_default()
    }

    /// Number of nodes including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn start_ticks(&self) -> i64 {
        self.start_ticks
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn tree_stats(&self, id: NodeId, total_ticks: i64) -> MethodStatsNode {
        let node = &self.nodes[id.0];
        let mut children: Vec<MethodStatsNode> = self
            .children(id)
            .map(|child| self.tree_stats(child, total_ticks))
            .collect();
        // stable: equal ticks keep table order
        children.sort_by(|a, b| b.stats.ticks.cmp(&a.stats.ticks));

        MethodStatsNode {
            stats: MethodStats {
                method: node.method().cloned(),
                calls: node.calls(),
                ticks: node.ticks(),
                percent: percent_of(node.ticks(), total_ticks),
            },
            children,
        }
    }

    fn flat_stats(&self, id: NodeId, by_method: &mut HashMap<MethodRef, MethodStats>) {
        let node = &self.nodes[id.0];
        let mut self_ticks = node.ticks();
        for child in self.children(id) {
            self.flat_stats(child, by_method);
            self_ticks -= self.nodes[child.0].ticks();
        }

        let Some(method) = node.method() else {
            return;
        };
        match by_method.entry(method.generic_definition()) {
            Entry::Occupied(mut entry) => {
                let stats = entry.get_mut();
                stats.calls += node.calls();
                stats.ticks += self_ticks;
            }
            Entry::Vacant(entry) => {
                let method = entry.key().clone();
                entry.insert(MethodStats::new(Some(method), node.calls(), self_ticks));
            }
        }
    }
}
