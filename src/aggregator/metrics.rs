//! Calculate performance metrics and hot spans from run results.
//!
//! Hot spans are the keys that consume the most time.
//! These are the primary targets for optimization.

use super::stack_builder::CollapsedStack;
use crate::ranking::RankedSet;
use crate::report::schema::{HotSpan, SlowSpan};
use crate::tracker::{CallTreeNode, FlatStat};
use crate::utils::error::RankingError;
use log::debug;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::time::Duration;

/// Duration as fractional milliseconds
pub fn to_millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Calculate the keys with the largest total time
///
/// Keys that never accrued time are left out. Equal times rank by name.
///
/// # Arguments
/// * `stats` - Flat stats of a run
/// * `top_n` - Number of keys to return (e.g., 5)
///
/// # Errors
/// * `RankingError::InvalidArgument` - `top_n` is zero
pub fn calculate_hot_spans<K>(
    stats: &HashMap<K, FlatStat<K>>,
    top_n: usize,
) -> Result<Vec<HotSpan>, RankingError>
where
    K: Display + Eq + Hash,
{
    debug!("Calculating top {} hot spans from {} keys", top_n, stats.len());

    let tracked: Duration = stats.values().map(|stat| stat.top_level_time).sum();
    let mut ranked = RankedSet::new(top_n, hot_span_key)?;

    let mut candidates: Vec<HotSpan> = stats
        .values()
        .filter(|stat| !stat.total_time.is_zero())
        .map(|stat| create_hot_span(stat, tracked))
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    for span in candidates {
        ranked.insert(span);
    }

    Ok(ranked.into_payloads())
}

fn hot_span_key(span: &HotSpan) -> f64 {
    span.total_time_ms
}

/// Create a HotSpan from a FlatStat
pub fn create_hot_span<K: Display>(stat: &FlatStat<K>, tracked: Duration) -> HotSpan {
    let percentage = if tracked.is_zero() {
        0.0
    } else {
        stat.total_time.as_nanos() as f64 * 100.0 / tracked.as_nanos() as f64
    };

    HotSpan {
        name: stat.name.to_string(),
        calls: stat.total,
        total_time_ms: to_millis(stat.total_time),
        top_level_time_ms: to_millis(stat.top_level_time),
        percentage,
    }
}

/// Calculate the slowest individual root spans
///
/// Roots that took no time are left out. Equal times keep begin order.
///
/// # Errors
/// * `RankingError::InvalidArgument` - `top_n` is zero
pub fn calculate_slowest_roots<K: Display>(
    roots: &[CallTreeNode<K>],
    top_n: usize,
) -> Result<Vec<SlowSpan>, RankingError> {
    debug!("Calculating top {} slowest of {} roots", top_n, roots.len());

    let mut ranked = RankedSet::new(top_n, slow_span_key)?;

    for root in roots.iter().filter(|root| !root.elapsed().is_zero()) {
        ranked.insert(SlowSpan {
            name: root.key.to_string(),
            start_ms: to_millis(root.start_time),
            elapsed_ms: to_millis(root.elapsed()),
            span_count: root.span_count(),
        });
    }

    Ok(ranked.into_payloads())
}

fn slow_span_key(span: &SlowSpan) -> f64 {
    span.elapsed_ms
}

/// Calculate self time distribution statistics
///
/// # Arguments
/// * `stacks` - Collapsed stacks
///
/// # Returns
/// Statistics about how self time spreads over paths
pub fn calculate_time_distribution(stacks: &[CollapsedStack]) -> TimeDistribution {
    if stacks.is_empty() {
        return TimeDistribution::default();
    }

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = weights.iter().sum();
    let count = weights.len();
    let mean = total / count as u64;
    let median = weights[count / 2];

    // Top 10% of stacks
    let top_10_percent_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_us: u64 = weights.iter().take(top_10_percent_count).sum();

    TimeDistribution {
        total_us: total,
        stack_count: count,
        mean_us_per_stack: mean,
        median_us_per_stack: median,
        top_10_percent_percentage: if total > 0 {
            (top_10_percent_us as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Self time distribution statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeDistribution {
    /// Self time across all stacks
    pub total_us: u64,

    /// Number of unique stacks
    pub stack_count: usize,

    pub mean_us_per_stack: u64,
    pub median_us_per_stack: u64,

    /// Percentage of total self time in the top 10% of stacks
    pub top_10_percent_percentage: f64,
}

impl TimeDistribution {
    /// Returns true if top 10% of stacks hold >80% of self time
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {}µs | Stacks: {} | Mean: {}µs | Median: {}µs | Top 10%: {:.1}%",
            self.total_us,
            self.stack_count,
            self.mean_us_per_stack,
            self.median_us_per_stack,
            self.top_10_percent_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(
        name: &'static str,
        total: u64,
        top_level: u64,
        total_ms: u64,
        top_ms: u64,
    ) -> FlatStat<&'static str> {
        FlatStat {
            name,
            total,
            top_level,
            total_time: Duration::from_millis(total_ms),
            top_level_time: Duration::from_millis(top_ms),
        }
    }

    fn stats_map(
        stats: Vec<FlatStat<&'static str>>,
    ) -> HashMap<&'static str, FlatStat<&'static str>> {
        stats.into_iter().map(|stat| (stat.name, stat)).collect()
    }

    #[test]
    fn test_calculate_hot_spans() {
        let stats = stats_map(vec![
            stat("gadget", 2, 2, 80, 80),
            stat("widget", 5, 0, 30, 0),
            stat("sprocket", 1, 1, 20, 20),
        ]);

        let hot = calculate_hot_spans(&stats, 2).unwrap();

        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].name, "gadget");
        assert_eq!(hot[0].percentage, 80.0);
        assert_eq!(hot[1].name, "widget");
        assert_eq!(hot[1].calls, 5);
    }

    #[test]
    fn test_hot_spans_skip_zero_time_and_tie_by_name() {
        let stats = stats_map(vec![
            stat("zeta", 1, 1, 10, 10),
            stat("alpha", 1, 1, 10, 10),
            stat("instant", 3, 3, 0, 0),
        ]);

        let hot = calculate_hot_spans(&stats, 5).unwrap();
        let names: Vec<&str> = hot.iter().map(|h| h.name.as_str()).collect();

        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_hot_spans_zero_top_n() {
        let stats = stats_map(vec![stat("gadget", 1, 1, 5, 5)]);
        assert!(matches!(
            calculate_hot_spans(&stats, 0),
            Err(RankingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_calculate_slowest_roots() {
        let leaf = |key, start: u64, end: u64| CallTreeNode {
            key,
            start_time: Duration::from_millis(start),
            end_time: Duration::from_millis(end),
            children: vec![],
        };
        let roots = vec![
            leaf("a", 0, 5),
            leaf("b", 5, 25),
            leaf("c", 25, 25),
            leaf("d", 25, 45),
        ];

        let slowest = calculate_slowest_roots(&roots, 2).unwrap();
        let names: Vec<&str> = slowest.iter().map(|s| s.name.as_str()).collect();

        // b and d tie; b began first
        assert_eq!(names, vec!["b", "d"]);
        assert_eq!(slowest[0].elapsed_ms, 20.0);
        assert_eq!(slowest[1].start_ms, 25.0);
    }

    #[test]
    fn test_calculate_time_distribution() {
        let stacks = vec![
            CollapsedStack::new("stack1".to_string(), 8500, 1),
            CollapsedStack::new("stack2".to_string(), 1000, 1),
            CollapsedStack::new("stack3".to_string(), 250, 1),
            CollapsedStack::new("stack4".to_string(), 250, 1),
        ];

        let dist = calculate_time_distribution(&stacks);

        assert_eq!(dist.total_us, 10000);
        assert_eq!(dist.stack_count, 4);
        assert_eq!(dist.mean_us_per_stack, 2500);
        assert!(dist.is_highly_concentrated()); // Top stack holds 85%
    }

    #[test]
    fn test_time_distribution_empty() {
        let dist = calculate_time_distribution(&[]);
        assert_eq!(dist.total_us, 0);
        assert_eq!(dist.stack_count, 0);
        assert!(!dist.is_highly_concentrated());
    }
}
