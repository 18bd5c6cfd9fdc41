//! Date Pattern Matcher core types

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Month names and abbreviations accepted in month-name forms
pub(crate) const MONTH_ALTERNATION: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Similarity required for an OCR-mangled keyword to count
pub const FUZZY_KEYWORD_SIMILARITY: f64 = 0.8;

/// Keywords shorter than this are only matched exactly
pub const FUZZY_KEYWORD_MIN_LEN: usize = 6;

// ============================================================
// Error Types
// ============================================================

/// Pattern table construction errors
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid pattern {id:?}: {source}")]
    InvalidRegex {
        id: PatternId,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, PatternError>;

// ============================================================
// Core Data Structures
// ============================================================

/// Known date shapes, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternId {
    /// `D{1,2}[/-]D{1,2}[/-]D{2,4}`, day/month order ambiguous
    SlashedTriplet,
    /// `D{4}[/.-]D{1,2}[/.-]D{1,2}`
    YearFirstTriplet,
    /// `D{1,2}.D{1,2}.D{2,4}`, day/month order ambiguous
    DottedTriplet,
    /// `D{1,2}[/.-]D{4}`, month and four-digit year
    MonthLongYear,
    /// `D{1,2}[/.-]D{2}`, month and two-digit year
    MonthShortYear,
    /// `Month D, Y`
    MonthNameDayYear,
    /// `D Month, Y`
    DayMonthNameYear,
    /// `Month YYYY`
    MonthNameYear,
}

impl PatternId {
    /// All patterns, highest priority first
    pub const ALL: [PatternId; 8] = [
        PatternId::SlashedTriplet,
        PatternId::YearFirstTriplet,
        PatternId::DottedTriplet,
        PatternId::MonthLongYear,
        PatternId::MonthShortYear,
        PatternId::MonthNameDayYear,
        PatternId::DayMonthNameYear,
        PatternId::MonthNameYear,
    ];

    /// Human-readable shape
    pub fn shape(&self) -> &'static str {
        match self {
            PatternId::SlashedTriplet => "MM/DD/YYYY",
            PatternId::YearFirstTriplet => "YYYY/MM/DD",
            PatternId::DottedTriplet => "MM.DD.YYYY",
            PatternId::MonthLongYear => "MM/YYYY",
            PatternId::MonthShortYear => "MM/YY",
            PatternId::MonthNameDayYear => "Month DD, YYYY",
            PatternId::DayMonthNameYear => "DD Month YYYY",
            PatternId::MonthNameYear => "Month YYYY",
        }
    }

    /// Regex source matched against lowercased text (ASCII digits only)
    pub fn regex_source(&self) -> String {
        match self {
            PatternId::SlashedTriplet => {
                r"([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{2,4})".to_string()
            }
            PatternId::YearFirstTriplet => {
                r"([0-9]{4})[/.-]([0-9]{1,2})[/.-]([0-9]{1,2})".to_string()
            }
            PatternId::DottedTriplet => r"([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{2,4})".to_string(),
            PatternId::MonthLongYear => r"([0-9]{1,2})[/.-]([0-9]{4})".to_string(),
            PatternId::MonthShortYear => r"([0-9]{1,2})[/.-]([0-9]{2})".to_string(),
            PatternId::MonthNameDayYear => format!(
                r"\b({MONTH_ALTERNATION})\.?\s+([0-9]{{1,2}})(?:st|nd|rd|th)?,?\s+([0-9]{{4}}|[0-9]{{2}})\b"
            ),
            PatternId::DayMonthNameYear => format!(
                r"\b([0-9]{{1,2}})(?:st|nd|rd|th)?\s+({MONTH_ALTERNATION})\.?,?\s+([0-9]{{4}}|[0-9]{{2}})\b"
            ),
            PatternId::MonthNameYear => {
                format!(r"\b({MONTH_ALTERNATION})\.?,?\s+([0-9]{{4}})\b")
            }
        }
    }

    /// Strong shapes name a full day; weak shapes name only a month
    pub fn strength(&self) -> PatternStrength {
        match self {
            PatternId::MonthLongYear | PatternId::MonthShortYear | PatternId::MonthNameYear => {
                PatternStrength::Weak
            }
            _ => PatternStrength::Strong,
        }
    }

    /// True for the purely numeric shapes
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            PatternId::MonthNameDayYear | PatternId::DayMonthNameYear | PatternId::MonthNameYear
        )
    }
}

/// How much a match on a shape says about being a real date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStrength {
    Strong,
    Weak,
}

/// A date-shaped substring found in fragment text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    /// Matched substring (lowercased)
    pub text: String,
    pub pattern: PatternId,
    /// Byte offsets into the lowercased text
    pub start: usize,
    pub end: usize,
}
