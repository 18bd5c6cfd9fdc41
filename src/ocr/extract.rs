//! Fragment extraction and ranking
//!
//! Turns engine blocks into [`TextFragment`]s: one per block and one per
//! distinct line inside it. Engine failures are logged and reported as
//! "no text", never propagated.

use std::collections::HashSet;

use tracing::{trace, warn};

use super::types::{
    OcrEngine, TextBlock, TextFragment, BEST_FRAGMENT_MIN_HINT, HINT_BASE, HINT_DATE_BONUS,
    HINT_DIGITS_BONUS, HINT_DOT_BONUS, HINT_LONG_PENALTY, HINT_SHORT_PENALTY,
};
use crate::date_pattern::contains_expiry_keyword;
use crate::normalize::ImageVariant;

/// Three-letter month prefixes recognized by [`looks_like_date`]
const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Run the engine on a variant and collect its fragments
///
/// An empty variant is not sent to the engine.
pub fn extract_text<E>(engine: &mut E, variant: &ImageVariant) -> Vec<TextFragment>
where
    E: OcrEngine + ?Sized,
{
    if variant.is_empty() {
        trace!(variant = %variant.tag, "Skipping empty variant");
        return Vec::new();
    }

    match engine.recognize(&variant.image) {
        Ok(blocks) => fragments_from_blocks(&blocks),
        Err(e) => {
            warn!(engine = engine.name(), variant = %variant.tag, "OCR failed: {}", e);
            Vec::new()
        }
    }
}

/// Flatten blocks into fragments, dropping blank and repeated text
pub fn fragments_from_blocks(blocks: &[TextBlock]) -> Vec<TextFragment> {
    let mut seen = HashSet::new();
    let mut fragments = Vec::new();

    let mut push = |text: &str, confidence: Option<f32>, region| {
        let text = text.trim();
        if text.is_empty() || !seen.insert(text.to_string()) {
            return;
        }
        let confidence_hint = confidence
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or_else(|| estimate_confidence(text));
        fragments.push(TextFragment {
            text: text.to_string(),
            confidence_hint,
            region,
        });
    };

    for block in blocks {
        push(&block.text, block.confidence, block.bounds);
        for line in &block.lines {
            push(&line.text, None, line.bounds);
        }
    }

    fragments
}

/// Heuristic confidence for engines that report none
pub fn estimate_confidence(text: &str) -> f32 {
    let mut confidence = HINT_BASE;
    if text.chars().any(|c| c.is_ascii_digit()) {
        confidence += HINT_DIGITS_BONUS;
    }
    if text.contains('.') {
        confidence += HINT_DOT_BONUS;
    }
    if looks_like_date(text) {
        confidence += HINT_DATE_BONUS;
    }

    let len = text.chars().count();
    if len < 3 {
        confidence -= HINT_SHORT_PENALTY;
    }
    if len > 20 {
        confidence -= HINT_LONG_PENALTY;
    }
    confidence.clamp(0.0, 1.0)
}

/// Cheap check for date-like text
///
/// True for two digit groups joined by `/`, `.` or `-` (at least one group
/// of two or more digits), or a month abbreviation next to a number.
pub fn looks_like_date(text: &str) -> bool {
    has_separated_numbers(text) || has_month_next_to_number(text)
}

fn has_separated_numbers(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let run_at = |start: usize| {
        chars[start..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count()
    };

    let mut i = 0;
    while i < chars.len() {
        let lead = run_at(i);
        if lead == 0 {
            i += 1;
            continue;
        }
        let sep = i + lead;
        if sep + 1 < chars.len() && matches!(chars[sep], '/' | '.' | '-') {
            let trail = run_at(sep + 1);
            if trail > 0 && (lead >= 2 || trail >= 2) {
                return true;
            }
        }
        i = sep;
    }
    false
}

fn has_month_next_to_number(text: &str) -> bool {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    let is_month = |w: &str| MONTH_PREFIXES.iter().any(|m| w.starts_with(m));
    let is_number = |w: &str| w.starts_with(|c: char| c.is_ascii_digit());

    words.windows(2).any(|pair| {
        (is_month(pair[0]) && is_number(pair[1])) || (is_number(pair[0]) && is_month(pair[1]))
    })
}

/// Priority used to order fragments before pattern matching
pub fn fragment_priority(text: &str) -> f32 {
    let mut priority = 0.0;
    if text.chars().count() > 3 {
        priority += 0.3;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        priority += 0.4;
    }
    if contains_expiry_keyword(&text.to_lowercase()) {
        priority += 0.3;
    }
    priority
}

/// Order fragments by priority, highest first; ties keep engine order
pub fn rank_fragments(mut fragments: Vec<TextFragment>) -> Vec<TextFragment> {
    fragments.sort_by(|a, b| {
        fragment_priority(&b.text)
            .partial_cmp(&fragment_priority(&a.text))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fragments
}

/// Date-like fragments with a hint above 0.6, most confident first
pub fn best_date_fragments(fragments: &[TextFragment]) -> Vec<TextFragment> {
    let mut best: Vec<TextFragment> = fragments
        .iter()
        .filter(|f| looks_like_date(&f.text) && f.confidence_hint > BEST_FRAGMENT_MIN_HINT)
        .cloned()
        .collect();
    best.sort_by(|a, b| {
        b.confidence_hint
            .partial_cmp(&a.confidence_hint)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::types::{OcrError, Result, TextLine, TextRegion};
    use image::DynamicImage;

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&mut self, _image: &DynamicImage) -> Result<Vec<TextBlock>> {
            Err(OcrError::EngineFailure("corrupt buffer".into()))
        }
    }

    #[test]
    fn test_engine_failure_is_no_text() {
        let variant = ImageVariant::new(DynamicImage::new_luma8(8, 8), "original");
        assert!(extract_text(&mut FailingEngine, &variant).is_empty());
    }

    #[test]
    fn test_empty_variant_not_sent() {
        let variant = ImageVariant::empty("original");
        assert!(extract_text(&mut FailingEngine, &variant).is_empty());
    }

    #[test]
    fn test_blocks_and_lines_deduplicated() {
        let mut block = TextBlock::from_lines(["BEST BEFORE", "03.04.27"]);
        block.bounds = Some(TextRegion::new(0, 0, 100, 40));
        block.lines[1].bounds = Some(TextRegion::new(0, 20, 60, 20));
        let single = TextBlock::single_line("LOT 7");

        let fragments = fragments_from_blocks(&[block, single]);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["BEST BEFORE\n03.04.27", "BEST BEFORE", "03.04.27", "LOT 7"]
        );
        assert_eq!(fragments[2].region, Some(TextRegion::new(0, 20, 60, 20)));
    }

    #[test]
    fn test_blank_lines_dropped() {
        let block = TextBlock {
            text: "  ".into(),
            lines: vec![TextLine::new(""), TextLine::new("EXP")],
            bounds: None,
            confidence: None,
        };
        let fragments = fragments_from_blocks(&[block]);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "EXP");
    }

    #[test]
    fn test_engine_confidence_preferred() {
        let mut block = TextBlock::single_line("hello");
        block.confidence = Some(1.7);
        let fragments = fragments_from_blocks(&[block]);
        assert_eq!(fragments[0].confidence_hint, 1.0);
    }

    #[test]
    fn test_estimate_confidence() {
        // digits + dot + date-like
        assert!((estimate_confidence("03.04.27") - 1.0).abs() < 1e-6);
        // short noise
        assert!((estimate_confidence("ab") - 0.3).abs() < 1e-6);
        // long text without digits
        let long = "ingredients sugar salt water";
        assert!((estimate_confidence(long) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_looks_like_date() {
        assert!(looks_like_date("12/25/2026"));
        assert!(looks_like_date("2027.01.05"));
        assert!(looks_like_date("exp 03/26"));
        assert!(looks_like_date("Jan 15"));
        assert!(looks_like_date("15 March 2027"));
        assert!(!looks_like_date("1-2"));
        assert!(!looks_like_date("LOT 4471"));
        assert!(!looks_like_date("marmalade"));
    }

    #[test]
    fn test_rank_fragments_stable() {
        let fragments = vec![
            TextFragment::new("abc"),
            TextFragment::new("NET WT"),
            TextFragment::new("12/25/2026"),
            TextFragment::new("EXP 12/25/2026"),
            TextFragment::new("NET WW"),
        ];
        let ranked = rank_fragments(fragments);
        let texts: Vec<&str> = ranked.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["EXP 12/25/2026", "12/25/2026", "NET WT", "NET WW", "abc"]
        );
    }

    #[test]
    fn test_best_date_fragments() {
        let fragments = vec![
            TextFragment {
                text: "12/25/2026".into(),
                confidence_hint: 0.7,
                region: None,
            },
            TextFragment {
                text: "01/02/2030".into(),
                confidence_hint: 0.9,
                region: None,
            },
            TextFragment {
                text: "05/06/2031".into(),
                confidence_hint: 0.5,
                region: None,
            },
            TextFragment {
                text: "hello".into(),
                confidence_hint: 0.95,
                region: None,
            },
        ];
        let best = best_date_fragments(&fragments);
        let texts: Vec<&str> = best.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["01/02/2030", "12/25/2026"]);
    }
}
