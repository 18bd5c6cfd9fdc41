//! Date Parser & Validator module
//!
//! Converts date-shaped spans into calendar dates.
//!
//! # Features
//!
//! - Month-first or day-first convention for ambiguous numeric dates,
//!   switching when the month position holds a value above 12
//! - Two-digit year expansion around a pivot (default 50)
//! - End-of-month expansion for month/year forms
//! - Strict calendar validation (no silent correction)
//! - Freshness check against a supplied "today"
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{parse_date, ParseOptions, PatternId};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let date = parse_date("03/26", PatternId::MonthShortYear, today, &ParseOptions::default());
//! assert_eq!(date, Ok(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
//! ```

mod parse;
mod types;

pub use parse::{
    build_date, ensure_future, expand_two_digit_year, last_day_of_month, month_from_name,
    parse_date, parse_year, resolve_day_month, ymd,
};
pub use types::{
    DayMonthOrder, ParseError, ParseOptions, ParseOptionsBuilder, Result, DEFAULT_YEAR_PIVOT,
};
