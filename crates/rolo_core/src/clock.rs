//! Time source injected into everything that compares against "now".
//!
//! # Responsibility
//! - Provide the wall-clock instant used for urgency and lifecycle checks.
//! - Provide epoch milliseconds used for record IDs and audit timestamps.
//!
//! Lifecycle evaluation is lazy: expiry is only detected when the active
//! meeting collection is observed, so every observation path takes its
//! "now" from this trait rather than reading the system clock directly.

use chrono::{Local, NaiveDateTime, Utc};

/// Source of the current time.
pub trait Clock {
    /// Local wall-clock instant, comparable to meeting `date` + `time`.
    fn now(&self) -> NaiveDateTime;

    /// Epoch milliseconds, used for record IDs and `archived_at` stamps.
    fn epoch_millis(&self) -> i64;
}

/// System clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Deterministic clock for tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Parses `YYYY-MM-DDTHH:MM:SS`.
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(Self::at)
    }

    pub fn advance(&mut self, delta: chrono::Duration) {
        self.now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn epoch_millis(&self) -> i64 {
        self.now.and_utc().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::Duration;

    #[test]
    fn fixed_clock_parses_and_advances() {
        let mut clock = FixedClock::parse("2024-01-01T12:01:00").expect("valid timestamp");
        let before = clock.epoch_millis();
        clock.advance(Duration::minutes(1));
        assert_eq!(clock.epoch_millis() - before, 60_000);
        assert_eq!(clock.now().format("%H:%M:%S").to_string(), "12:02:00");
    }
}
