//! Time sources for span measurements.
//!
//! The tracker never reads the system clock directly. Hosts that mock time
//! (e.g. test suites freezing `now`) inject an unmocked clock, and tests of the
//! profiler itself use [`ManualClock`] to get exact durations.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Offset from the clock's origin
pub type Timestamp = Duration;

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// `Instant`-backed clock, measuring from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so a handle kept by the caller can move the
/// clock owned by a tracker.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Timestamp) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
