//! expiry-scan - Expiry date recognition for food package photos
//!
//! Extracts the expiration ("best before", "use by") date from a package
//! photo despite uneven lighting, varied fonts and dot-matrix print.
//!
//! # Pipeline
//!
//! 1. [`normalize`]: scaled, cropped, contrast-stretched and binarized
//!    variants of the photo
//! 2. [`ocr`]: text fragments from an injected OCR engine
//! 3. [`dot_matrix`]: template-matched dot digits when OCR finds no date text
//! 4. [`date_pattern`]: date-shaped spans and expiry keywords
//! 5. [`date_parse`]: calendar dates, day/month disambiguation, freshness
//! 6. [`detector`]: confidence scoring, strategy cascade, early exit
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{DetectorOptions, ExpiryDateDetector, FixedClock, RawImage, StaticTextEngine};
//! use image::RgbaImage;
//!
//! let engine = StaticTextEngine::new(["BEST BEFORE 03.04.27"]);
//! let mut detector = ExpiryDateDetector::open(engine, DetectorOptions::default())
//!     .unwrap()
//!     .with_clock(FixedClock::ymd(2026, 6, 1).unwrap());
//!
//! let photo = RawImage::from_rgba(RgbaImage::new(48, 48));
//! let date = detector.detect_expiry_date(&photo).unwrap().unwrap();
//! assert_eq!(date.to_string(), "2027-03-04");
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod date_parse;
pub mod date_pattern;
pub mod detector;
pub mod dot_matrix;
pub mod monitor;
pub mod normalize;
pub mod ocr;

// CLI
pub use cli::{exit_codes, Cli, Commands, DetectionArgs, InfoArgs, ParseArgs, ScanArgs};

// Clock
pub use clock::{Clock, FixedClock, SystemClock};

// Config
pub use config::{CliOverrides, Config, ConfigError};

// Date parsing
pub use date_parse::{parse_date, DayMonthOrder, ParseError, ParseOptions};

// Date patterns
pub use date_pattern::{
    contains_expiry_keyword, find_expiry_keyword, DatePatternSet, DateSpan, PatternError,
    PatternId,
};

// Detector
pub use detector::{
    CancellationToken, CandidateSource, DateCandidate, DetectionReport, DetectorError,
    DetectorOptions, ExpiryDateDetector, ExtractionMethod, ScoreWeights, StrategyOutcome,
    StrategySpec,
};

// Dot matrix
pub use dot_matrix::{
    render_dot_digits, DigitLayout, DotMatrixMatch, DotMatrixOptions, DotMatrixRecognizer,
    DotStyle,
};

// Monitoring
pub use monitor::{DetectionPhase, PerformanceMonitor, PerformanceStats};

// Normalization
pub use normalize::{apply_chain, ContrastPreset, ImageVariant, NormalizeError, RawImage, Transform};

// OCR
pub use ocr::{
    best_date_fragments, extract_text, NoopEngine, OcrEngine, OcrError, OcrSession,
    StaticTextEngine, TextBlock, TextFragment,
};
