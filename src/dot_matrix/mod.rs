//! Dot-Pattern Digit Recognizer module
//!
//! Reads dates printed as sparse dot-matrix digits, which general OCR
//! engines trained on solid fonts frequently miss.
//!
//! # Features
//!
//! - Dot connection through dilation
//! - Row-scan number-line detection with vertical growth and padding
//! - Equal-width digit slots sized from the glyph height
//! - 5x5 template matching with an agreement threshold
//! - Fixed eight- and six-digit date layouts with freshness check
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{render_dot_digits, DotMatrixRecognizer, DotStyle};
//! use chrono::NaiveDate;
//! use image::DynamicImage;
//!
//! let image = DynamicImage::ImageLuma8(render_dot_digits(&[1, 2, 3, 1, 2, 0, 3, 0], &DotStyle::default()));
//! let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let found = DotMatrixRecognizer::default().detect_date(&image, today).unwrap();
//! assert_eq!(found.date, NaiveDate::from_ymd_opt(2030, 12, 31).unwrap());
//! ```

mod recognize;
mod templates;
mod types;

pub use recognize::{assemble_date, layout_fields, DotMatrixRecognizer, RegionDigits};
pub use templates::{agreement, digit_template, match_digit, render_dot_digits, DotStyle};
pub use types::{
    DigitLayout, DigitRegion, DotMatrixMatch, DotMatrixOptions, DotMatrixOptionsBuilder, Glyph,
    DEFAULT_MATCH_THRESHOLD, MAX_DIGIT_SLOTS, MIN_DATE_DIGITS,
};
