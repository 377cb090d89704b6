//! Nested span tracking with flat per-key statistics.
//!
//! Every tracked invocation opens a span and closes it when its guard is
//! finished or dropped, so the bookkeeping runs on every exit path including
//! unwinding. Closing a span updates the key's [`FlatStat`]; spans opened at
//! depth 1 also count as top-level. In tree mode the span is additionally
//! recorded in a [`CallTreeBuilder`].
//!
//! The tracker is driven by one sequential call sequence. State lives behind
//! a `RefCell` so a tracked body can re-enter `track` on the same tracker.

use super::call_tree::{CallTreeBuilder, CallTreeNode};
use super::clock::{Clock, MonotonicClock, Timestamp};
use crate::utils::error::TrackerError;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Tracker configuration, resolved once at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Reconstruct the call tree in addition to flat stats
    pub collect_tree: bool,
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, collect_tree: bool) -> Self {
        self.collect_tree = collect_tree;
        self
    }
}

/// Aggregated statistics for one span key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatStat<K> {
    pub name: K,
    /// Number of closed spans with this key
    pub total: u64,
    /// Number of those spans opened outside any other span
    pub top_level: u64,
    pub total_time: Duration,
    pub top_level_time: Duration,
}

impl<K> FlatStat<K> {
    pub fn new(name: K) -> Self {
        Self {
            name,
            total: 0,
            top_level: 0,
            total_time: Duration::ZERO,
            top_level_time: Duration::ZERO,
        }
    }

    /// Mean time of one invocation
    pub fn time_per_call(&self) -> Duration {
        if self.total == 0 {
            return Duration::ZERO;
        }
        self.total_time.div_f64(self.total as f64)
    }

    fn record(&mut self, elapsed: Duration, top_level: bool) {
        self.total += 1;
        self.total_time += elapsed;
        if top_level {
            self.top_level += 1;
            self.top_level_time += elapsed;
        }
    }
}

/// Snapshot of one run, handed to report builders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult<K: Eq + Hash> {
    /// Outermost spans in begin order (empty unless tree mode is on)
    pub roots: Vec<CallTreeNode<K>>,
    pub flat_stats: HashMap<K, FlatStat<K>>,
}

impl<K: Eq + Hash> RunResult<K> {
    pub fn total_spans(&self) -> u64 {
        self.flat_stats.values().map(|stat| stat.total).sum()
    }

    pub fn top_level_spans(&self) -> u64 {
        self.flat_stats.values().map(|stat| stat.top_level).sum()
    }

    /// Time spent inside top-level spans
    pub fn tracked_time(&self) -> Duration {
        self.flat_stats.values().map(|stat| stat.top_level_time).sum()
    }

    pub fn unique_keys(&self) -> usize {
        self.flat_stats.len()
    }
}

#[derive(Debug)]
struct TrackerState<K> {
    running: bool,
    depth: usize,
    stats: HashMap<K, FlatStat<K>>,
    tree: Option<CallTreeBuilder<K>>,
}

/// Span still waiting for its close
#[derive(Debug)]
struct OpenSpan<K> {
    key: K,
    start_time: Timestamp,
    /// Depth right after this span was opened
    depth: usize,
}

/// Tracks nested spans for a single run
pub struct SpanTracker<K, C = MonotonicClock>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    clock: C,
    config: TrackerConfig,
    state: RefCell<TrackerState<K>>,
}

impl<K> SpanTracker<K, MonotonicClock>
where
    K: Clone + Eq + Hash,
{
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<K, C> SpanTracker<K, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    pub fn with_clock(config: TrackerConfig, clock: C) -> Self {
        Self {
            clock,
            config,
            state: RefCell::new(TrackerState {
                running: false,
                depth: 0,
                stats: HashMap::new(),
                tree: config.collect_tree.then(CallTreeBuilder::new),
            }),
        }
    }

    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Clear stats and the call tree before a new run
    ///
    /// # Errors
    /// * `TrackerError::InvalidState` - spans are still open
    pub fn reset(&self) -> Result<(), TrackerError> {
        let mut state = self.state.borrow_mut();

        if state.depth > 0 {
            return Err(TrackerError::InvalidState(format!(
                "cannot reset while {} span(s) are open",
                state.depth
            )));
        }

        debug!("Resetting span tracker ({} keys tracked)", state.stats.len());
        state.stats.clear();
        if let Some(tree) = state.tree.as_mut() {
            tree.clear();
        }

        Ok(())
    }

    pub fn start(&self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            debug!("Span tracker already running");
            return;
        }
        state.running = true;
        info!(
            "Span tracking started (call tree: {})",
            if self.config.collect_tree { "on" } else { "off" }
        );
    }

    /// Stop accounting new spans; spans already open still close normally
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        if state.depth > 0 {
            warn!("Span tracker stopped with {} span(s) still open", state.depth);
        } else {
            info!("Span tracking stopped ({} keys tracked)", state.stats.len());
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Number of currently open spans
    pub fn depth(&self) -> usize {
        self.state.borrow().depth
    }

    /// Open a span for `key`
    ///
    /// The span closes when the returned guard is finished or dropped.
    /// While the tracker is stopped the guard does nothing.
    pub fn enter(&self, key: K) -> SpanGuard<'_, K, C> {
        let mut state = self.state.borrow_mut();

        if !state.running {
            return SpanGuard {
                tracker: self,
                open: None,
            };
        }

        let start_time = self.clock.now();
        state.depth += 1;
        let depth = state.depth;
        if let Some(tree) = state.tree.as_mut() {
            tree.open(key.clone(), start_time);
        }

        SpanGuard {
            tracker: self,
            open: Some(OpenSpan {
                key,
                start_time,
                depth,
            }),
        }
    }

    /// Run `body` inside a span for `key`, returning its value unchanged
    ///
    /// The span is closed and accounted before a panic in `body` continues
    /// to unwind. An `Err` returned by `body` is passed back untouched.
    pub fn track<T>(&self, key: K, body: impl FnOnce() -> T) -> T {
        let _guard = self.enter(key);
        body()
    }

    /// Copy of the per-key statistics
    pub fn flat_stats(&self) -> HashMap<K, FlatStat<K>> {
        self.state.borrow().stats.clone()
    }

    /// Copy of the completed roots (empty unless tree mode is on)
    pub fn roots(&self) -> Vec<CallTreeNode<K>> {
        self.state
            .borrow()
            .tree
            .as_ref()
            .map(|tree| tree.roots().to_vec())
            .unwrap_or_default()
    }

    pub fn result(&self) -> RunResult<K> {
        RunResult {
            roots: self.roots(),
            flat_stats: self.flat_stats(),
        }
    }

    /// Account `span` if it is the innermost open one; on error nothing changes
    fn close(&self, span: &OpenSpan<K>) -> Result<Duration, TrackerError> {
        let end_time = self.clock.now();
        let mut state = self.state.borrow_mut();

        if state.depth != span.depth {
            return Err(TrackerError::InvalidState(format!(
                "span closed out of order: opened at depth {}, current depth is {}",
                span.depth, state.depth
            )));
        }

        if let Some(tree) = state.tree.as_mut() {
            if tree.depth() != span.depth {
                return Err(TrackerError::InvalidState(format!(
                    "call tree has {} open frame(s) but depth is {}",
                    tree.depth(),
                    span.depth
                )));
            }
            tree.close(end_time)?;
        }

        state.depth -= 1;

        let elapsed = end_time.saturating_sub(span.start_time);
        let top_level = span.depth == 1;
        state
            .stats
            .entry(span.key.clone())
            .or_insert_with(|| FlatStat::new(span.key.clone()))
            .record(elapsed, top_level);

        Ok(elapsed)
    }
}

/// Scoped span; closes on [`SpanGuard::finish`] or drop
#[must_use = "dropping the guard closes the span immediately"]
pub struct SpanGuard<'a, K, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    tracker: &'a SpanTracker<K, C>,
    open: Option<OpenSpan<K>>,
}

impl<K, C> SpanGuard<'_, K, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    /// Whether this guard is accounting a span
    pub fn is_tracking(&self) -> bool {
        self.open.is_some()
    }

    /// Close the span, returning its elapsed time
    ///
    /// An inert or already closed guard yields `None`. A rejected close
    /// leaves the span open on this guard, to be finished again once the
    /// spans opened after it are closed, or on drop.
    ///
    /// # Errors
    /// * `TrackerError::InvalidState` - the span is not the innermost open one
    pub fn finish(&mut self) -> Result<Option<Duration>, TrackerError> {
        let Some(span) = self.open.as_ref() else {
            return Ok(None);
        };

        let elapsed = self.tracker.close(span)?;
        self.open = None;
        Ok(Some(elapsed))
    }
}

impl<K, C> Drop for SpanGuard<'_, K, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    fn drop(&mut self) {
        let Some(span) = self.open.take() else {
            return;
        };

        if let Err(err) = self.tracker.close(&span) {
            if std::thread::panicking() {
                error!("Failed to close span while unwinding: {}", err);
            } else {
                panic!("{}", err);
            }
        }
    }
}
