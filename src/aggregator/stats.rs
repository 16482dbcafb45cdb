//! Statistics snapshots produced by the call tree.

use super::method::MethodRef;
use serde::{Deserialize, Serialize};

/// Aggregated numbers for one method or call path
///
/// **Public** - element of both snapshot forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStats {
    /// `None` for the root and for time outside any traced call
    pub method: Option<MethodRef>,

    pub calls: u64,

    /// Inclusive ticks in the tree form, self ticks in the flat form
    pub ticks: i64,

    /// Share of the snapshot's elapsed ticks
    pub percent: f64,
}

impl MethodStats {
    pub fn new(method: Option<MethodRef>, calls: u64, ticks: i64) -> Self {
        Self {
            method,
            calls,
            ticks,
            percent: 0.0,
        }
    }

    /// One-line rendering, e.g. `App.Run: 3 calls, 1200 ticks (42.50%)`
    pub fn summary(&self) -> String {
        let name = match &self.method {
            Some(method) => method.to_string(),
            None => "<untracked>".to_string(),
        };
        format!(
            "{}: {} calls, {} ticks ({:.2}%)",
            name, self.calls, self.ticks, self.percent
        )
    }
}

/// Percentage of `total`, 0 when nothing elapsed
pub(crate) fn percent_of(ticks: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ticks as f64 * 100.0 / total as f64
}

/// Hierarchical snapshot node
///
/// **Public** - returned by `MethodCallTree::stats_as_tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStatsNode {
    pub stats: MethodStats,

    /// Ordered by descending inclusive ticks
    pub children: Vec<MethodStatsNode>,
}

impl MethodStatsNode {
    /// Child whose method displays as `name`
    pub fn child(&self, name: &str) -> Option<&MethodStatsNode> {
        self.children.iter().find(|child| {
            child
                .stats
                .method
                .as_ref()
                .is_some_and(|method| method.to_string() == name)
        })
    }

    /// Inclusive ticks minus the children's inclusive ticks
    pub fn self_ticks(&self) -> i64 {
        self.stats.ticks - self.children.iter().map(|child| child.stats.ticks).sum::<i64>()
    }

    /// Nodes below this one, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MethodStatsNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_guard() {
        assert_eq!(percent_of(50, 0), 0.0);
        assert_eq!(percent_of(25, 200), 12.5);
    }

    #[test]
    fn test_summary() {
        let mut stats = MethodStats::new(Some(MethodRef::new("App", "Run")), 3, 1200);
        stats.percent = 42.5;
        assert_eq!(stats.summary(), "App.Run: 3 calls, 1200 ticks (42.50%)");

        let untracked = MethodStats::new(None, 1, 7);
        assert_eq!(untracked.summary(), "<untracked>: 1 calls, 7 ticks (0.00%)");
    }

    #[test]
    fn test_self_ticks() {
        let leaf = |ticks| MethodStatsNode {
            stats: MethodStats::new(Some(MethodRef::new("T", "leaf")), 1, ticks),
            children: Vec::new(),
        };
        let node = MethodStatsNode {
            stats: MethodStats::new(Some(MethodRef::new("T", "parent")), 1, 100),
            children: vec![leaf(30), leaf(20)],
        };
        assert_eq!(node.self_ticks(), 50);
        assert_eq!(node.node_count(), 3);
        assert!(node.child("T.leaf").is_some());
        assert!(node.child("T.other").is_none());
    }
}
