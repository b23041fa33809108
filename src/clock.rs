//! Wall-clock source for the "Generated" timestamp.

use chrono::{Local, NaiveDateTime};

/// Supplies render time. Reports read the clock exactly once per render.
pub trait ReportClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReportClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl ReportClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
