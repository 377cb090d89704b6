//! Assemble a [`Profile`] from a tracked run.
//!
//! The profile is the in-memory model external renderers (HTML, flamegraph,
//! JSON dumps) consume. Nothing here touches the filesystem.

use super::schema::{Profile, StatRow};
use crate::aggregator::{
    build_collapsed_stacks, calculate_hot_spans, calculate_slowest_roots,
    calculate_time_distribution, to_millis,
};
use crate::tracker::{FlatStat, RunResult};
use crate::utils::config::{DEFAULT_TOP_COUNT, SCHEMA_VERSION};
use crate::utils::error::RankingError;
use chrono::Utc;
use log::{debug, info};
use std::fmt::Display;
use std::hash::Hash;

/// Build the profile of a run
///
/// # Arguments
/// * `result` - Snapshot taken from the tracker after the run
/// * `top_n` - Entries kept in the hot span and slowest root rankings
///
/// # Errors
/// * `RankingError::InvalidArgument` - `top_n` is zero
pub fn to_profile<K>(result: &RunResult<K>, top_n: usize) -> Result<Profile, RankingError>
where
    K: Display + Eq + Hash,
{
    info!(
        "Building profile: {} spans over {} keys",
        result.total_spans(),
        result.unique_keys()
    );

    let hot_spans = calculate_hot_spans(&result.flat_stats, top_n)?;
    let slowest_roots = calculate_slowest_roots(&result.roots, top_n)?;
    let stacks = build_collapsed_stacks(&result.roots);

    if !stacks.is_empty() {
        debug!("Self time distribution: {}", calculate_time_distribution(&stacks).summary());
    }

    Ok(Profile {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        total_spans: result.total_spans(),
        top_level_spans: result.top_level_spans(),
        tracked_time_ms: to_millis(result.tracked_time()),
        unique_keys: result.unique_keys(),
        stats: stat_rows(result),
        hot_spans,
        slowest_roots,
        stacks,
    })
}

/// Build the profile of a run keeping the default number of ranked entries
pub fn to_default_profile<K>(result: &RunResult<K>) -> Result<Profile, RankingError>
where
    K: Display + Eq + Hash,
{
    to_profile(result, DEFAULT_TOP_COUNT)
}

/// Rows sorted by total calls, then top-level calls, then name
fn stat_rows<K>(result: &RunResult<K>) -> Vec<StatRow>
where
    K: Display + Eq + Hash,
{
    let mut rows: Vec<StatRow> = result.flat_stats.values().map(stat_row).collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| b.top_level.cmp(&a.top_level))
            .then_with(|| a.name.cmp(&b.name))
    });

    rows
}

fn stat_row<K: Display>(stat: &FlatStat<K>) -> StatRow {
    StatRow {
        name: stat.name.to_string(),
        total: stat.total,
        top_level: stat.top_level,
        total_time_ms: to_millis(stat.total_time),
        time_per_call_ms: to_millis(stat.time_per_call()),
        top_level_time_ms: to_millis(stat.top_level_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ManualClock, SpanTracker, TrackerConfig};
    use std::time::Duration;

    fn sample_result(collect_tree: bool) -> RunResult<String> {
        let clock = ManualClock::new();
        let tracker = SpanTracker::with_clock(
            TrackerConfig::new().with_tree(collect_tree),
            clock.clone(),
        );
        tracker.start();

        for _ in 0..2 {
            tracker.track("user".to_string(), || {
                clock.advance(Duration::from_millis(4));
                tracker.track("account".to_string(), || {
                    clock.advance(Duration::from_millis(6))
                });
            });
        }
        tracker.track("account".to_string(), || clock.advance(Duration::from_millis(1)));

        tracker.stop();
        tracker.result()
    }

    #[test]
    fn test_profile_totals() {
        let profile = to_profile(&sample_result(true), 5).unwrap();

        assert_eq!(profile.version, SCHEMA_VERSION);
        assert_eq!(profile.total_spans, 5);
        assert_eq!(profile.top_level_spans, 3);
        assert_eq!(profile.tracked_time_ms, 21.0);
        assert_eq!(profile.unique_keys, 2);
        assert_eq!(profile.slowest_roots.len(), 3);
        assert_eq!(profile.stacks.len(), 3);
    }

    #[test]
    fn test_stat_rows_sorted_by_total() {
        let profile = to_profile(&sample_result(false), 5).unwrap();

        let names: Vec<&str> = profile.stats.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["account", "user"]);

        let account = &profile.stats[0];
        assert_eq!((account.total, account.top_level), (3, 1));
        assert_eq!(account.total_time_ms, 13.0);
        assert_eq!(account.top_level_time_ms, 1.0);
    }

    #[test]
    fn test_flat_only_profile_has_no_tree_sections() {
        let profile = to_profile(&sample_result(false), 5).unwrap();

        assert!(profile.slowest_roots.is_empty());
        assert!(profile.stacks.is_empty());
        assert_eq!(profile.hot_spans.len(), 2);
    }

    #[test]
    fn test_default_profile_keeps_default_top_count() {
        let clock = ManualClock::new();
        let tracker = SpanTracker::with_clock(TrackerConfig::new().with_tree(true), clock.clone());
        tracker.start();
        for millis in 1..=8u64 {
            tracker.track(format!("key{}", millis), || {
                clock.advance(Duration::from_millis(millis))
            });
        }
        tracker.stop();

        let profile = to_default_profile(&tracker.result()).unwrap();

        assert_eq!(profile.hot_spans.len(), DEFAULT_TOP_COUNT);
        assert_eq!(profile.slowest_roots.len(), DEFAULT_TOP_COUNT);
        assert_eq!(profile.hot_spans[0].name, "key8");
        assert_eq!(profile.stats.len(), 8);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        assert!(to_profile(&sample_result(false), 0).is_err());
    }
}
