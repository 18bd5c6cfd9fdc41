//! Calendar "today" providers
//!
//! The freshness rule compares every parsed date against the current day.
//! Detection reads the day once per call through a [`Clock`] so tests can pin it.

use chrono::{Local, NaiveDate};

/// Source of the current calendar day
pub trait Clock: Send + Sync {
    /// Current local date
    fn today(&self) -> NaiveDate;
}

/// Device clock (local time zone)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Create a clock pinned to `year-month-day`, `None` for an illegal date
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::ymd(2026, 1, 1).unwrap();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_fixed_clock_rejects_illegal_day() {
        assert!(FixedClock::ymd(2026, 2, 30).is_none());
        assert!(FixedClock::ymd(2026, 13, 1).is_none());
    }

    #[test]
    fn test_system_clock_is_plausible() {
        let today = SystemClock.today();
        assert!(today > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_clock_as_trait_object() {
        let clocks: Vec<Box<dyn Clock>> = vec![
            Box::new(SystemClock),
            Box::new(FixedClock::ymd(2030, 6, 15).unwrap()),
        ];
        assert_eq!(
            clocks[1].today(),
            NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
        );
    }
}
