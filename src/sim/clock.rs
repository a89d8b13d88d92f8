//! Process-wide logical clock.
//!
//! A single monotonically non-decreasing integer advanced by
//! `max(current, candidate)`. Actors read a working time, do their delay
//! outside any lock, then advance by the sum and stamp their event inside
//! the clock's critical section so emitted stamps never run backwards.

use std::sync::Mutex;

pub struct LogicalClock {
    time: Mutex<u64>,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self { time: Mutex::new(0) }
    }

    /// Snapshot the current time.
    pub fn now(&self) -> u64 {
        self.read_then(|time| time)
    }

    /// Advance to `max(current, candidate)` and return the new value.
    pub fn advance(&self, candidate: u64) -> u64 {
        self.advance_then(candidate, |time| time)
    }

    /// Advance to `max(current, candidate)` and run `f` on the updated value
    /// before the critical section ends. `f` must be O(1) and non-blocking;
    /// values handed to `f` are non-decreasing in the order `f` runs.
    pub fn advance_then<R>(&self, candidate: u64, f: impl FnOnce(u64) -> R) -> R {
        let mut time = self.time.lock().expect("clock lock poisoned");
        *time = (*time).max(candidate);
        f(*time)
    }

    /// Run `f` on the current value without advancing, under the same
    /// critical section as [`advance_then`](Self::advance_then).
    pub fn read_then<R>(&self, f: impl FnOnce(u64) -> R) -> R {
        let time = self.time.lock().expect("clock lock poisoned");
        f(*time)
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}
