//! Dot-Pattern Digit Recognizer core types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================
// Constants
// ============================================================

/// Dilation radius that merges neighbouring dots into strokes
pub const DEFAULT_CONNECT_RADIUS: u8 = 2;

/// Minimum length of a dark run (pixels) for a number line
pub const DEFAULT_MIN_SPAN: u32 = 20;

/// Minimum number of ink runs inside a number line
pub const DEFAULT_MIN_DOTS: u32 = 3;

/// Largest blank gap bridged while scanning a row
pub const DEFAULT_MAX_GAP: u32 = 32;

/// Horizontal region padding
pub const DEFAULT_PADDING_X: u32 = 10;

/// Vertical region padding
pub const DEFAULT_PADDING_Y: u32 = 5;

/// Dates carry at most eight digits
pub const MAX_DIGIT_SLOTS: usize = 8;

/// Fewer digits than this cannot form a date
pub const MIN_DATE_DIGITS: usize = 6;

/// Template agreement a slot must exceed to yield a digit
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.7;

/// Stricter agreement used by [`DotMatrixOptions::strict`]
pub const STRICT_MATCH_THRESHOLD: f32 = 0.85;

/// Inter-digit gap relative to glyph height
pub const DEFAULT_GAP_RATIO: f32 = 0.4;

/// Template grid size (cells per side)
pub const GRID: usize = 5;

/// Regions lower than this cannot be sampled on the template grid
pub const MIN_REGION_HEIGHT: u32 = GRID as u32;

// ============================================================
// Core Data Structures
// ============================================================

/// A 5x5 dot pattern, `true` = dot present
pub type Glyph = [[bool; GRID]; GRID];

/// Candidate number line in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl DigitRegion {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Fixed digit orders tried when assembling a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigitLayout {
    /// MMDDYYYY
    Mmddyyyy,
    /// DDMMYYYY
    Ddmmyyyy,
    /// YYYYMMDD
    Yyyymmdd,
    /// MMDDYY
    Mmddyy,
    /// DDMMYY
    Ddmmyy,
    /// YYMMDD
    Yymmdd,
}

impl DigitLayout {
    /// Layouts for eight recognized digits, in trial order
    pub const EIGHT_DIGIT: [DigitLayout; 3] = [
        DigitLayout::Mmddyyyy,
        DigitLayout::Ddmmyyyy,
        DigitLayout::Yyyymmdd,
    ];

    /// Layouts for six recognized digits, in trial order
    pub const SIX_DIGIT: [DigitLayout; 3] = [
        DigitLayout::Mmddyy,
        DigitLayout::Ddmmyy,
        DigitLayout::Yymmdd,
    ];

    /// Layouts applicable to a digit count
    pub fn for_len(len: usize) -> &'static [DigitLayout] {
        match len {
            8 => &Self::EIGHT_DIGIT,
            6 => &Self::SIX_DIGIT,
            _ => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DigitLayout::Mmddyyyy => "MMDDYYYY",
            DigitLayout::Ddmmyyyy => "DDMMYYYY",
            DigitLayout::Yyyymmdd => "YYYYMMDD",
            DigitLayout::Mmddyy => "MMDDYY",
            DigitLayout::Ddmmyy => "DDMMYY",
            DigitLayout::Yymmdd => "YYMMDD",
        }
    }
}

/// Date read from dot-matrix digits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DotMatrixMatch {
    pub date: NaiveDate,
    pub digits: Vec<u8>,
    pub layout: DigitLayout,
    pub region: DigitRegion,
    /// Mean template agreement of the recognized digits
    pub agreement: f32,
}

// ============================================================
// Options
// ============================================================

/// Dot-matrix recognition options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotMatrixOptions {
    /// Dilation radius used to connect dots (0 disables)
    pub connect_radius: u8,
    /// Gray level below which a pixel is ink
    pub ink_threshold: u8,
    /// Minimum number-line run length
    pub min_span: u32,
    /// Minimum ink runs per number line
    pub min_dots: u32,
    /// Largest gap bridged inside a number line
    pub max_gap: u32,
    /// Horizontal padding added around regions
    pub padding_x: u32,
    /// Vertical padding added around regions
    pub padding_y: u32,
    /// Upper bound on digit slots per region
    pub max_digits: usize,
    /// Template agreement a slot must exceed
    pub match_threshold: f32,
    /// Inter-digit gap relative to glyph height
    pub gap_ratio: f32,
}

impl Default for DotMatrixOptions {
    fn default() -> Self {
        Self {
            connect_radius: DEFAULT_CONNECT_RADIUS,
            ink_threshold: 128,
            min_span: DEFAULT_MIN_SPAN,
            min_dots: DEFAULT_MIN_DOTS,
            max_gap: DEFAULT_MAX_GAP,
            padding_x: DEFAULT_PADDING_X,
            padding_y: DEFAULT_PADDING_Y,
            max_digits: MAX_DIGIT_SLOTS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            gap_ratio: DEFAULT_GAP_RATIO,
        }
    }
}

impl DotMatrixOptions {
    pub fn builder() -> DotMatrixOptionsBuilder {
        DotMatrixOptionsBuilder::default()
    }

    /// Small print: tighter dots and shorter lines
    pub fn fine_print() -> Self {
        Self {
            connect_radius: 1,
            min_span: 12,
            max_gap: 20,
            ..Default::default()
        }
    }

    /// Require closer template agreement
    pub fn strict() -> Self {
        Self {
            match_threshold: STRICT_MATCH_THRESHOLD,
            ..Default::default()
        }
    }

    /// Re-apply the builder limits to values set directly
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::builder()
            .connect_radius(self.connect_radius)
            .ink_threshold(self.ink_threshold)
            .min_span(self.min_span)
            .min_dots(self.min_dots)
            .max_gap(self.max_gap)
            .padding(self.padding_x, self.padding_y)
            .max_digits(self.max_digits)
            .match_threshold(self.match_threshold)
            .gap_ratio(self.gap_ratio)
            .build()
    }
}

/// Builder for DotMatrixOptions
#[derive(Debug, Default)]
pub struct DotMatrixOptionsBuilder {
    options: DotMatrixOptions,
}

impl DotMatrixOptionsBuilder {
    /// Set dot connection radius (clamped to 0-8)
    #[must_use]
    pub fn connect_radius(mut self, radius: u8) -> Self {
        self.options.connect_radius = radius.min(8);
        self
    }

    #[must_use]
    pub fn ink_threshold(mut self, threshold: u8) -> Self {
        self.options.ink_threshold = threshold;
        self
    }

    /// Set minimum line span (at least 1)
    #[must_use]
    pub fn min_span(mut self, span: u32) -> Self {
        self.options.min_span = span.max(1);
        self
    }

    /// Set minimum ink runs per line (at least 1)
    #[must_use]
    pub fn min_dots(mut self, dots: u32) -> Self {
        self.options.min_dots = dots.max(1);
        self
    }

    #[must_use]
    pub fn max_gap(mut self, gap: u32) -> Self {
        self.options.max_gap = gap;
        self
    }

    #[must_use]
    pub fn padding(mut self, x: u32, y: u32) -> Self {
        self.options.padding_x = x;
        self.options.padding_y = y;
        self
    }

    /// Set maximum digit slots (clamped to 1-8)
    #[must_use]
    pub fn max_digits(mut self, max: usize) -> Self {
        self.options.max_digits = max.clamp(1, MAX_DIGIT_SLOTS);
        self
    }

    /// Set template agreement threshold (clamped to 0.0-1.0)
    #[must_use]
    pub fn match_threshold(mut self, threshold: f32) -> Self {
        self.options.match_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set inter-digit gap ratio (clamped to 0.0-2.0)
    #[must_use]
    pub fn gap_ratio(mut self, ratio: f32) -> Self {
        self.options.gap_ratio = ratio.clamp(0.0, 2.0);
        self
    }

    #[must_use]
    pub fn build(self) -> DotMatrixOptions {
        self.options
    }
}
