//! Controllable clock for tests.
//!
//! Lets tests produce snapshots with distinct, predictable timestamps.

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDateTime};

use super::Clock;

/// A [`Clock`] whose time only moves when told to.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the store owns another.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().expect("lock poisoned") = at;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("lock poisoned");
        *now += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("lock poisoned")
    }
}
