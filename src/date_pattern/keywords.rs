//! Expiry keyword detection
//!
//! Keywords are matched on letter-only words so that OCR output such as
//! `EXP12/25/2026` or `BEST BEFORE:03.04.27` still counts. Long keywords
//! also tolerate a single OCR substitution.

use strsim::normalized_levenshtein;

use super::types::{FUZZY_KEYWORD_MIN_LEN, FUZZY_KEYWORD_SIMILARITY};

/// Phrases that mark a nearby date as an expiry date
pub const EXPIRY_KEYWORDS: [&str; 15] = [
    "best if used by",
    "best before",
    "use before",
    "exp date",
    "best by",
    "sell by",
    "use by",
    "expiration",
    "expiring",
    "expires",
    "expiry",
    "exp",
    "bbd",
    "bb",
    "bbe",
];

/// First expiry keyword found in `text`, if any (case-insensitive)
pub fn find_expiry_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    let joined = format!(" {} ", words.join(" "));

    let exact = EXPIRY_KEYWORDS.iter().find(|keyword| {
        if keyword.contains(' ') {
            joined.contains(&format!(" {keyword} "))
        } else {
            words.iter().any(|w| w == *keyword)
        }
    });
    if let Some(keyword) = exact {
        return Some(keyword);
    }

    // OCR may read letters as digits ("exp1res"), so compare alphanumeric tokens
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= FUZZY_KEYWORD_MIN_LEN - 1)
        .find_map(|token| {
            EXPIRY_KEYWORDS
                .iter()
                .filter(|k| !k.contains(' ') && k.len() >= FUZZY_KEYWORD_MIN_LEN)
                .find(|k| normalized_levenshtein(token, k) >= FUZZY_KEYWORD_SIMILARITY)
                .copied()
        })
}

/// True when `text` carries an expiry keyword
pub fn contains_expiry_keyword(text: &str) -> bool {
    find_expiry_keyword(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_keywords() {
        assert_eq!(find_expiry_keyword("EXP 12/25/2026"), Some("exp"));
        assert_eq!(find_expiry_keyword("EXP12/25/2026"), Some("exp"));
        assert_eq!(find_expiry_keyword("Expires: 01/2027"), Some("expires"));
        assert_eq!(find_expiry_keyword("BBD 03.04.27"), Some("bbd"));
    }

    #[test]
    fn test_phrase_keywords() {
        assert_eq!(
            find_expiry_keyword("best before 03.04.27"),
            Some("best before")
        );
        assert_eq!(
            find_expiry_keyword("BEST   IF USED BY: 12/01/2027"),
            Some("best if used by")
        );
        assert_eq!(find_expiry_keyword("Use By 05/06/27"), Some("use by"));
        assert_eq!(find_expiry_keyword("sell-by 05/06/27"), Some("sell by"));
    }

    #[test]
    fn test_no_false_positives_inside_words() {
        assert!(!contains_expiry_keyword("EXPORT QUALITY"));
        assert!(!contains_expiry_keyword("bubble tea"));
        assert!(!contains_expiry_keyword("NET WT 200g"));
        assert!(!contains_expiry_keyword("12/25/2026"));
        assert!(!contains_expiry_keyword(""));
    }

    #[test]
    fn test_fuzzy_keywords() {
        assert_eq!(find_expiry_keyword("EXPlRY 10/10/2030"), Some("expiry"));
        assert_eq!(find_expiry_keyword("explres 12/2027"), Some("expires"));
        assert!(!contains_expiry_keyword("express"));
    }
}
