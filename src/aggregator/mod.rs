//! Aggregation of run results into collapsed stacks and metrics.
//!
//! This module transforms tracked runs into:
//! - Collapsed stack format (per-path self time, for flamegraph renderers)
//! - Hot span analysis (top time consumers by key)
//! - Slowest root invocations
//! - Self time distribution statistics

pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use metrics::{
    calculate_hot_spans, calculate_slowest_roots, calculate_time_distribution, to_millis,
    TimeDistribution,
};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
