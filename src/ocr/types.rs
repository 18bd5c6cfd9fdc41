//! Text Extraction Adapter core types

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Starting point of the heuristic confidence hint
pub const HINT_BASE: f32 = 0.5;

/// Hint bonus for text containing digits
pub const HINT_DIGITS_BONUS: f32 = 0.2;

/// Hint bonus for text containing a dot
pub const HINT_DOT_BONUS: f32 = 0.15;

/// Hint bonus for text that looks like a date
pub const HINT_DATE_BONUS: f32 = 0.25;

/// Hint penalty for text shorter than 3 characters
pub const HINT_SHORT_PENALTY: f32 = 0.2;

/// Hint penalty for text longer than 20 characters
pub const HINT_LONG_PENALTY: f32 = 0.1;

/// Minimum hint for `best_date_fragments`
pub const BEST_FRAGMENT_MIN_HINT: f32 = 0.6;

// ============================================================
// Error Types
// ============================================================

/// OCR adapter error types
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine failed: {0}")]
    EngineFailure(String),

    #[error("OCR session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, OcrError>;

// ============================================================
// Core Data Structures
// ============================================================

/// Axis-aligned bounding box in variant pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TextRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One line inside a recognized block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub text: String,
    pub bounds: Option<TextRegion>,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounds: None,
        }
    }
}

/// A block of text as reported by an OCR engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    /// Full block text (lines joined)
    pub text: String,
    /// Sub-lines, possibly empty
    pub lines: Vec<TextLine>,
    pub bounds: Option<TextRegion>,
    /// Engine-reported confidence, when the engine has one
    pub confidence: Option<f32>,
}

impl TextBlock {
    /// Single-line block
    pub fn single_line(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lines: vec![TextLine::new(text.clone())],
            text,
            bounds: None,
            confidence: None,
        }
    }

    /// Block made of several lines joined by newlines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<TextLine> = lines.into_iter().map(TextLine::new).collect();
        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text,
            lines,
            bounds: None,
            confidence: None,
        }
    }
}

/// Recognized text handed to the pattern matcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFragment {
    pub text: String,
    /// Engine or heuristic confidence in [0, 1]
    pub confidence_hint: f32,
    pub region: Option<TextRegion>,
}

impl TextFragment {
    /// Fragment without a region, hint estimated from the text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let confidence_hint = super::extract::estimate_confidence(&text);
        Self {
            text,
            confidence_hint,
            region: None,
        }
    }
}

// ============================================================
// Engine Trait
// ============================================================

/// External OCR capability
///
/// Implementations may hold heavy native resources; they are owned by an
/// [`OcrSession`](super::OcrSession) which calls [`release`](Self::release)
/// exactly once.
pub trait OcrEngine {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Recognize text blocks in an image. An empty list is a valid outcome.
    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<TextBlock>>;

    /// Free engine resources
    fn release(&mut self) {}
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<TextBlock>> {
        (**self).recognize(image)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
