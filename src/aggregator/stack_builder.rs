//! Build collapsed stack format from a call-tree snapshot.
//!
//! Collapsed stacks are the input format of flamegraph tools.
//! Format: "caller;callee;grandchild weight"
//!
//! Example: "App.Main;App.Load;App.Parse 1000"
//! This means: Main called Load which called Parse, and 1000 ticks were
//! spent in Parse itself on that path.

use super::stats::MethodStatsNode;
use crate::utils::config::STACK_SEPARATOR;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - consumed by flamegraph renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Frames from outermost to innermost, separated by `;`
    pub stack: String,

    /// Self ticks spent on this path
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Line in folded-stack file format
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Fold a tree snapshot into collapsed stacks
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `tree` - Snapshot from `MethodCallTree::stats_as_tree`
///
/// # Returns
/// One entry per distinct call path, weighted by self ticks and sorted by
/// weight descending
///
/// # Algorithm
/// 1. Walk the snapshot depth-first below the root
/// 2. Join the method names on the way down into the stack string
/// 3. Weight each path by inclusive ticks minus its children's ticks
/// 4. Aggregate paths that render identically
pub fn collapse_stats(tree: &MethodStatsNode) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    let mut frames: Vec<String> = Vec::new();

    for child in &tree.children {
        collapse_node(child, &mut frames, &mut stack_map);
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

fn collapse_node(node: &MethodStatsNode, frames: &mut Vec<String>, stack_map: &mut HashMap<String, u64>) {
    let frame = match &node.stats.method {
        Some(method) => method.to_string(),
        None => "unknown".to_string(),
    };
    frames.push(frame);

    // clock skew can make a child outlast its parent
    let weight = u64::try_from(node.self_ticks()).unwrap_or(0);
    *stack_map.entry(frames.join(STACK_SEPARATOR)).or_insert(0) += weight;

    for child in &node.children {
        collapse_node(child, frames, stack_map);
    }

    frames.pop();
}
