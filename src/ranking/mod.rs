//! Bounded ranking of results by a metric.
//!
//! Used wherever a report should only keep the top-K items
//! (slowest keys, slowest root spans) without retaining the whole population.

pub mod ranked_set;

pub use ranked_set::{RankedEntry, RankedSet};
