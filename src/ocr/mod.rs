//! Text Extraction Adapter module
//!
//! Wraps an external OCR engine and converts its output into ranked text
//! fragments for the date pattern matcher.
//!
//! # Features
//!
//! - `OcrEngine` trait for pluggable engines
//! - Scoped `OcrSession` with guaranteed release
//! - Block and sub-line fragments, duplicates removed
//! - Heuristic confidence hints when the engine reports none
//! - Fragment ranking by digit and keyword content
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{extract_text, ImageVariant, OcrSession, StaticTextEngine};
//! use image::DynamicImage;
//!
//! let mut session = OcrSession::open(StaticTextEngine::new(["EXP 12/25/2026"]));
//! let variant = ImageVariant::new(DynamicImage::new_luma8(32, 32), "original");
//! let fragments = extract_text(session.engine_mut().unwrap(), &variant);
//! assert_eq!(fragments[0].text, "EXP 12/25/2026");
//! session.close();
//! ```

mod engine;
mod extract;
mod types;

pub use engine::{NoopEngine, OcrSession, StaticTextEngine};
pub use extract::{
    best_date_fragments, estimate_confidence, extract_text, fragment_priority,
    fragments_from_blocks, looks_like_date, rank_fragments,
};
pub use types::{
    OcrEngine, OcrError, Result, TextBlock, TextFragment, TextLine, TextRegion,
    BEST_FRAGMENT_MIN_HINT,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ImageVariant;
    use image::DynamicImage;

    #[test]
    fn test_session_extract_roundtrip() {
        let mut session =
            OcrSession::open(StaticTextEngine::new(["BEST BEFORE 03.04.27", "NET 200G"]));
        let variant = ImageVariant::new(DynamicImage::new_luma8(16, 16), "full-resolution");
        let fragments = extract_text(session.engine_mut().unwrap(), &variant);
        assert_eq!(fragments.len(), 2);

        let ranked = rank_fragments(fragments);
        assert_eq!(ranked[0].text, "BEST BEFORE 03.04.27");
    }

    #[test]
    fn test_noop_engine_yields_nothing() {
        let mut engine = NoopEngine;
        let variant = ImageVariant::new(DynamicImage::new_luma8(16, 16), "original");
        assert!(extract_text(&mut engine, &variant).is_empty());
    }
}
