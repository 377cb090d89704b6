//! Span Prof
//!
//! Profiling of nested operations (e.g. object construction during a test
//! run). A [`SpanTracker`] wraps each operation in a span and produces:
//! - Flat statistics per span key (total/top-level counts and times)
//! - A call tree of how spans nested, for flamegraph-style reports
//!
//! A [`RankedSet`](ranking::RankedSet) keeps only the top-K results by a metric.
//!
//! ## Getting Started
//!
//! ```
//! use span_prof::{SpanTracker, TrackerConfig};
//!
//! let tracker = SpanTracker::new(TrackerConfig::new().with_tree(true));
//! tracker.reset().unwrap();
//! tracker.start();
//!
//! tracker.track("gadget", || {
//!     tracker.track("widget", || ());
//! });
//!
//! tracker.stop();
//! let result = tracker.result();
//! assert_eq!(result.flat_stats["widget"].top_level, 0);
//! assert_eq!(result.roots[0].children[0].key, "widget");
//! ```

pub mod aggregator;
pub mod ranking;
pub mod report;
pub mod tracker;
pub mod utils;

pub use ranking::{RankedEntry, RankedSet};
pub use tracker::{CallTreeNode, FlatStat, RunResult, SpanTracker, TrackerConfig};
