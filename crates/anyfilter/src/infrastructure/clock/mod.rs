//! Wall-clock source for snapshot timestamps.
//!
//! Snapshots record local time at second precision, matching the
//! `created_date` format of the history files.
//!
//! # Testability
//!
//! The `Clock` trait lets tests pin or advance time with [`mock::MockClock`]
//! instead of sleeping across second boundaries.

use chrono::{Local, NaiveDateTime};

pub mod mock;

/// Source of "now" for the configuration store.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
