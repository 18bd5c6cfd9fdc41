//! Date Pattern Matcher module
//!
//! Finds date-shaped substrings in recognized text and detects expiry
//! keywords.
//!
//! # Features
//!
//! - Numeric triplets with `/`, `-` or `.` separators
//! - Year-first triplets
//! - Month/year forms with two- or four-digit years
//! - Month-name forms in both orders, with ordinal days
//! - Expiry keyword detection with OCR-tolerant fuzzy matching
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{contains_expiry_keyword, DatePatternSet, PatternId};
//!
//! let patterns = DatePatternSet::standard().unwrap();
//! let spans = patterns.find_date_spans("EXP 12/25/2026");
//! assert_eq!(spans[0].text, "12/25/2026");
//! assert_eq!(spans[0].pattern, PatternId::SlashedTriplet);
//! assert!(contains_expiry_keyword("EXP 12/25/2026"));
//! ```

mod keywords;
mod matcher;
mod types;

pub use keywords::{contains_expiry_keyword, find_expiry_keyword, EXPIRY_KEYWORDS};
pub use matcher::{DatePattern, DatePatternSet};
pub use types::{
    DateSpan, PatternError, PatternId, PatternStrength, Result, FUZZY_KEYWORD_MIN_LEN,
    FUZZY_KEYWORD_SIMILARITY,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_and_span_independent() {
        let patterns = DatePatternSet::standard().unwrap();
        let text = "12/25/2026";
        assert_eq!(patterns.find_date_spans(text).len(), 1);
        assert!(!contains_expiry_keyword(text));

        let text = "EXP DATE";
        assert!(patterns.find_date_spans(text).is_empty());
        assert_eq!(find_expiry_keyword(text), Some("exp date"));
    }

    #[test]
    fn test_error_types() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = PatternError::InvalidRegex {
            id: PatternId::SlashedTriplet,
            source,
        };
        assert!(err.to_string().contains("SlashedTriplet"));
    }
}
