//! Report schema definitions for profile data.
//!
//! This module defines the structure handed to report renderers.
//! Schema is versioned to allow future evolution. Times are milliseconds.

use crate::aggregator::CollapsedStack;
use serde::{Deserialize, Serialize};

/// Top-level profile of one tracked run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when profile was generated (RFC 3339)
    pub generated_at: String,

    /// Number of closed spans
    pub total_spans: u64,

    /// Number of spans not nested inside another span
    pub top_level_spans: u64,

    /// Time spent inside top-level spans
    pub tracked_time_ms: f64,

    /// Number of distinct span keys
    pub unique_keys: usize,

    /// Per-key statistics, most used first
    pub stats: Vec<StatRow>,

    /// Keys with the largest total time
    pub hot_spans: Vec<HotSpan>,

    /// Slowest individual root spans (empty without a call tree)
    pub slowest_roots: Vec<SlowSpan>,

    /// Per-path self time (empty without a call tree)
    pub stacks: Vec<CollapsedStack>,
}

/// Flat statistics of one span key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub name: String,
    pub total: u64,
    pub top_level: u64,
    pub total_time_ms: f64,
    pub time_per_call_ms: f64,
    pub top_level_time_ms: f64,
}

/// A key ranked by its total time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotSpan {
    pub name: String,
    pub calls: u64,
    pub total_time_ms: f64,
    pub top_level_time_ms: f64,

    /// Share of tracked time; nested and recursive spans count in full,
    /// so values above 100 are possible
    pub percentage: f64,
}

/// A single root invocation ranked by its elapsed time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowSpan {
    pub name: String,
    pub start_ms: f64,
    pub elapsed_ms: f64,

    /// Spans in the subtree, including the root
    pub span_count: usize,
}
