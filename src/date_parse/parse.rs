//! Span to calendar date conversion
//!
//! Illegal dates are rejected, never corrected. Every accepted date must be
//! strictly after the supplied "today".

use chrono::NaiveDate;

use super::types::{DayMonthOrder, ParseError, ParseOptions, Result};
use crate::date_pattern::PatternId;

/// Parse a matched span into a future calendar date
pub fn parse_date(
    text: &str,
    pattern: PatternId,
    today: NaiveDate,
    options: &ParseOptions,
) -> Result<NaiveDate> {
    let date = build_date(text, pattern, options)?;
    ensure_future(date, today)
}

/// Parse a matched span into a calendar date without the freshness check
pub fn build_date(text: &str, pattern: PatternId, options: &ParseOptions) -> Result<NaiveDate> {
    let groups = digit_groups(text);

    match pattern {
        PatternId::SlashedTriplet | PatternId::DottedTriplet => {
            let [first, second, year] = take_groups::<3>(&groups, text)?;
            let year = parse_year(year, options.year_pivot)?;
            let (month, day) = resolve_day_month(
                parse_number(first)?,
                parse_number(second)?,
                options.order,
            );
            ymd(year, month, day)
        }
        PatternId::YearFirstTriplet => {
            let [year, month, day] = take_groups::<3>(&groups, text)?;
            if year.len() != 4 {
                return Err(ParseError::Malformed(text.to_string()));
            }
            ymd(
                parse_number(year)? as i32,
                parse_number(month)?,
                parse_number(day)?,
            )
        }
        PatternId::MonthLongYear | PatternId::MonthShortYear => {
            let [month, year] = take_groups::<2>(&groups, text)?;
            last_day_of_month(parse_year(year, options.year_pivot)?, parse_number(month)?)
        }
        PatternId::MonthNameDayYear | PatternId::DayMonthNameYear => {
            let month = month_in(text)?;
            let [day, year] = take_groups::<2>(&groups, text)?;
            ymd(
                parse_year(year, options.year_pivot)?,
                month,
                parse_number(day)?,
            )
        }
        PatternId::MonthNameYear => {
            let month = month_in(text)?;
            let [year] = take_groups::<1>(&groups, text)?;
            last_day_of_month(parse_year(year, options.year_pivot)?, month)
        }
    }
}

/// Reject dates on or before `today`
pub fn ensure_future(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate> {
    if date > today {
        Ok(date)
    } else {
        Err(ParseError::Expired { date, today })
    }
}

/// Order two ambiguous groups as `(month, day)`
///
/// The convention decides which group is the month; when that group exceeds
/// 12 the other reading is used instead.
pub fn resolve_day_month(first: u32, second: u32, order: DayMonthOrder) -> (u32, u32) {
    match order {
        DayMonthOrder::MonthFirst if first > 12 => (second, first),
        DayMonthOrder::MonthFirst => (first, second),
        DayMonthOrder::DayFirst if second > 12 => (first, second),
        DayMonthOrder::DayFirst => (second, first),
    }
}

/// Expand a two-digit year around the pivot
pub fn expand_two_digit_year(value: u32, pivot: u32) -> i32 {
    if value < pivot {
        2000 + value as i32
    } else {
        1900 + value as i32
    }
}

/// Parse a two- or four-digit year token
pub fn parse_year(token: &str, pivot: u32) -> Result<i32> {
    let value = parse_number(token)?;
    match token.len() {
        2 => Ok(expand_two_digit_year(value, pivot)),
        4 => Ok(value as i32),
        _ => Err(ParseError::Malformed(token.to_string())),
    }
}

/// Build a calendar-legal date
pub fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ParseError::InvalidCalendarDate { year, month, day })
}

/// Last calendar day of a month
pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    ymd(year, month, 1)?;
    let next = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    next.pred_opt().ok_or(ParseError::InvalidCalendarDate {
        year,
        month,
        day: 31,
    })
}

/// Month number from an English month name or abbreviation
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn month_in(text: &str) -> Result<u32> {
    text.split(|c: char| !c.is_alphabetic())
        .find_map(month_from_name)
        .ok_or_else(|| ParseError::Malformed(text.to_string()))
}

fn digit_groups(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .collect()
}

fn take_groups<'a, const N: usize>(groups: &[&'a str], text: &str) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(groups).map_err(|_| ParseError::Malformed(text.to_string()))
}

fn parse_number(token: &str) -> Result<u32> {
    token
        .parse::<u32>()
        .map_err(|_| ParseError::Malformed(token.to_string()))
}
