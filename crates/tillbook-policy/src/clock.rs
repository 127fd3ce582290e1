//! Injectable source of "now"

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Clock trait for time-dependent policy checks.
///
/// Production code uses [`SystemClock`]; tests pin time with [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock that uses the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for testing that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The fixed instant to return.
    pub instant: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a new fixed clock at the given instant.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Creates a fixed clock at 12:00 UTC on `date`.
    #[must_use]
    pub fn at_noon(date: NaiveDate) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(date.and_time(noon).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock::at_noon(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().hour(), 12);
        assert_eq!(clock.now().date_naive(), NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
    }
}
