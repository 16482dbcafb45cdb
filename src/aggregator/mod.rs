//! Aggregation of traced calls into a call tree and its snapshots.
//!
//! This module turns a stream of method start/finish events into:
//! - A call tree keyed by callee handle (one node per call path)
//! - Hierarchical and flat statistics snapshots
//! - Collapsed stacks (for flamegraph generation)

pub mod clock;
pub mod handle_table;
pub mod method;
pub mod node;
pub mod stack_builder;
pub mod stats;
pub mod tree;

// Re-export main types and functions
pub use clock::{ManualTicks, StopwatchTicks, TickSource};
pub use handle_table::{CallHandle, HandleTable};
pub use method::MethodRef;
pub use node::{MethodCallNode, NodeId};
pub use stack_builder::{collapse_stats, CollapsedStack};
pub use stats::{MethodStats, MethodStatsNode};
pub use tree::MethodCallTree;
