//! Call Graph Trace
//!
//! Core of a call-tracing profiler for CIL methods.
//!
//! The crate has two halves:
//!
//! - [`analyzer`] computes the maximum evaluation stack depth of a method
//!   body, so an instrumented body can be re-encoded with a correct
//!   max-stack header. Bodies are modelled in [`cil`].
//! - [`aggregator`] turns start/finish events of traced calls into a call
//!   tree and produces hierarchical and flat timing snapshots.
//!
//! ## Getting Started
//!
//! ```
//! use callgraph_trace::aggregator::{CallHandle, ManualTicks, MethodCallTree, MethodRef};
//!
//! let clock = ManualTicks::new(0);
//! let mut tree = MethodCallTree::with_clock(&clock);
//! let run = CallHandle::new(1).unwrap();
//!
//! tree.start_method(run, &MethodRef::new("App", "Run"));
//! tree.finish_method(run, 40).unwrap();
//!
//! clock.set(100);
//! let stats = tree.snapshot_list();
//! assert_eq!(stats[0].ticks, 60); // time outside traced calls
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod cil;
pub mod utils;
