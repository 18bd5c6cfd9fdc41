//! Confidence Scorer & Strategy Orchestrator module
//!
//! Runs the detection cascade over one photo and returns the first
//! sufficiently confident future date.
//!
//! # Features
//!
//! - Declarative strategy table (transform chain + extraction method)
//! - Keyword, pattern-strength and context confidence scoring
//! - Early exit above a high threshold, acceptance threshold otherwise
//! - Dot-matrix fallback when no date-shaped text was recognized
//! - Cooperative cancellation between strategies
//! - Optional shared performance monitor
//!
//! # Example
//!
//! ```rust
//! use expiry_scan::{DetectorOptions, ExpiryDateDetector, FixedClock, RawImage, StaticTextEngine};
//! use chrono::NaiveDate;
//! use image::RgbaImage;
//!
//! let engine = StaticTextEngine::new(["EXP 12/25/2026"]);
//! let mut detector = ExpiryDateDetector::open(engine, DetectorOptions::default())
//!     .unwrap()
//!     .with_clock(FixedClock::ymd(2026, 1, 1).unwrap());
//!
//! let photo = RawImage::from_rgba(RgbaImage::new(64, 64));
//! let date = detector.detect_expiry_date(&photo).unwrap();
//! assert_eq!(date, NaiveDate::from_ymd_opt(2026, 12, 25));
//! ```

mod cancel;
mod cascade;
mod score;
mod strategy;
mod types;

pub use cancel::CancellationToken;
pub use cascade::ExpiryDateDetector;
pub use score::{score_dot_matrix, score_fragment};
pub use strategy::{default_strategies, fast_strategies, ExtractionMethod, StrategySpec};
pub use types::{
    CandidateSource, DateCandidate, DetectionReport, DetectorError, DetectorOptions,
    DetectorOptionsBuilder, Result, ScoreWeights, ScoreWeightsBuilder, StrategyOutcome,
    DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_EARLY_EXIT_THRESHOLD,
};
