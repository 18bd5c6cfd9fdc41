//! Date Parser & Validator core types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Two-digit years below the pivot land in 2000-2049, the rest in 1950-1999
pub const DEFAULT_YEAR_PIVOT: u32 = 50;

/// Largest accepted pivot
pub const MAX_YEAR_PIVOT: u32 = 99;

// ============================================================
// Error Types
// ============================================================

/// Reasons a matched span does not become a date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed date text: {0}")]
    Malformed(String),

    #[error("Invalid calendar date: {year}-{month}-{day}")]
    InvalidCalendarDate { year: i32, month: u32, day: u32 },

    #[error("Date {date} is not after {today}")]
    Expired { date: NaiveDate, today: NaiveDate },
}

pub type Result<T> = std::result::Result<T, ParseError>;

// ============================================================
// Options
// ============================================================

/// Field order assumed when a numeric date could be read either way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayMonthOrder {
    /// `MM/DD/YYYY`, switching to day-first when the first group exceeds 12
    #[default]
    MonthFirst,
    /// `DD/MM/YYYY`, switching to month-first when the second group exceeds 12
    DayFirst,
}

/// Date parsing options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Convention for ambiguous numeric triplets
    pub order: DayMonthOrder,
    /// Two-digit year pivot
    pub year_pivot: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            order: DayMonthOrder::MonthFirst,
            year_pivot: DEFAULT_YEAR_PIVOT,
        }
    }
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }

    /// Day-first convention (European labels)
    pub fn day_first() -> Self {
        Self {
            order: DayMonthOrder::DayFirst,
            ..Default::default()
        }
    }

    /// Re-apply the builder limits to values set directly
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::builder()
            .order(self.order)
            .year_pivot(self.year_pivot)
            .build()
    }
}

/// Builder for ParseOptions
#[derive(Debug, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    #[must_use]
    pub fn order(mut self, order: DayMonthOrder) -> Self {
        self.options.order = order;
        self
    }

    /// Set the two-digit year pivot (clamped to 0-99)
    #[must_use]
    pub fn year_pivot(mut self, pivot: u32) -> Self {
        self.options.year_pivot = pivot.min(MAX_YEAR_PIVOT);
        self
    }

    #[must_use]
    pub fn build(self) -> ParseOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_default() {
        let opts = ParseOptions::default();
        assert_eq!(opts.order, DayMonthOrder::MonthFirst);
        assert_eq!(opts.year_pivot, 50);
    }

    #[test]
    fn test_parse_options_presets() {
        assert_eq!(ParseOptions::day_first().order, DayMonthOrder::DayFirst);
    }

    #[test]
    fn test_builder_clamping() {
        let opts = ParseOptions::builder()
            .order(DayMonthOrder::DayFirst)
            .year_pivot(250)
            .build();
        assert_eq!(opts.order, DayMonthOrder::DayFirst);
        assert_eq!(opts.year_pivot, 99);
    }

    #[test]
    fn test_clamped_direct_values() {
        let opts = ParseOptions {
            order: DayMonthOrder::DayFirst,
            year_pivot: 200,
        }
        .clamped();
        assert_eq!(opts.order, DayMonthOrder::DayFirst);
        assert_eq!(opts.year_pivot, 99);
    }

    #[test]
    fn test_options_from_toml() {
        let opts: ParseOptions = toml::from_str("order = \"day-first\"").unwrap();
        assert_eq!(opts.order, DayMonthOrder::DayFirst);
        assert_eq!(opts.year_pivot, 50);
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::InvalidCalendarDate {
            year: 2026,
            month: 13,
            day: 15,
        };
        assert_eq!(err.to_string(), "Invalid calendar date: 2026-13-15");

        let date = NaiveDate::from_ymd_opt(2020, 9, 20).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let err = ParseError::Expired { date, today };
        assert_eq!(err.to_string(), "Date 2020-09-20 is not after 2026-01-01");
    }
}
