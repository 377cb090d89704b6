//! Nested span tracking.
//!
//! This module turns span begin/end events into:
//! - Flat statistics per span key (counts and time sums)
//! - A call tree reconstructing how spans nested (optional)

pub mod call_tree;
pub mod clock;
pub mod span_tracker;

// Re-export main types
pub use call_tree::{CallTreeBuilder, CallTreeNode};
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use span_tracker::{FlatStat, RunResult, SpanGuard, SpanTracker, TrackerConfig};
