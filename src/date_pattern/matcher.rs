//! Date span matching
//!
//! Patterns are compiled once into a [`DatePatternSet`] and applied to
//! lowercased fragment text in priority order.

use regex::Regex;

use super::types::{DateSpan, PatternError, PatternId, Result};

/// A compiled date shape
#[derive(Debug, Clone)]
pub struct DatePattern {
    pub id: PatternId,
    pub regex: Regex,
    /// Lower is tried first
    pub priority: usize,
}

impl DatePattern {
    pub fn compile(id: PatternId, priority: usize) -> Result<Self> {
        let regex = Regex::new(&id.regex_source())
            .map_err(|source| PatternError::InvalidRegex { id, source })?;
        Ok(Self {
            id,
            regex,
            priority,
        })
    }

    pub fn shape(&self) -> &'static str {
        self.id.shape()
    }
}

/// Immutable table of compiled date patterns
#[derive(Debug, Clone)]
pub struct DatePatternSet {
    patterns: Vec<DatePattern>,
}

impl DatePatternSet {
    /// Every known shape in the default priority order
    pub fn standard() -> Result<Self> {
        Self::with_patterns(&PatternId::ALL)
    }

    /// A subset of shapes, prioritized in the given order
    pub fn with_patterns(ids: &[PatternId]) -> Result<Self> {
        let patterns = ids
            .iter()
            .enumerate()
            .map(|(priority, &id)| DatePattern::compile(id, priority))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Find every date-shaped span in `text`
    ///
    /// Spans come back grouped by pattern priority. A numeric match glued to
    /// further digits (e.g. `25/20` inside `12/25/2026`) is not a span, and
    /// a match lying inside an already found span is dropped.
    pub fn find_date_spans(&self, text: &str) -> Vec<DateSpan> {
        let lower = text.to_lowercase();
        let mut spans: Vec<DateSpan> = Vec::new();

        for pattern in &self.patterns {
            let mut pos = 0;
            while pos <= lower.len() {
                let Some(m) = pattern.regex.find_at(&lower, pos) else {
                    break;
                };

                let embedded = pattern.id.is_numeric() && is_embedded(&lower, m.start(), m.end());
                let covered = spans
                    .iter()
                    .any(|s| s.start <= m.start() && m.end() <= s.end);

                if embedded || covered {
                    pos = next_char_boundary(&lower, m.start());
                    continue;
                }

                spans.push(DateSpan {
                    text: m.as_str().to_string(),
                    pattern: pattern.id,
                    start: m.start(),
                    end: m.end(),
                });
                pos = m.end();
            }
        }

        spans
    }

    /// True when any pattern matches somewhere in `text`
    pub fn has_date_shape(&self, text: &str) -> bool {
        !self.find_date_spans(text).is_empty()
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '/' | '.' | '-')
}

/// Digit run continues on either side of `[start, end)`, possibly across a
/// single separator
fn is_embedded(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    let glued_before = match before.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if is_separator(c) => before.next().is_some_and(|d| d.is_ascii_digit()),
        _ => false,
    };

    let mut after = text[end..].chars();
    let glued_after = match after.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if is_separator(c) => after.next().is_some_and(|d| d.is_ascii_digit()),
        _ => false,
    };

    glued_before || glued_after
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| from + c.len_utf8())
}
