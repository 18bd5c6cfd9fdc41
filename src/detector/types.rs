//! Confidence Scorer & Strategy Orchestrator core types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::strategy::{default_strategies, fast_strategies, ExtractionMethod, StrategySpec};
use crate::date_parse::ParseOptions;
use crate::date_pattern::{PatternError, PatternId};
use crate::dot_matrix::{DigitLayout, DotMatrixOptions};

// ============================================================
// Constants
// ============================================================

/// Confidence every candidate starts from
pub const DEFAULT_BASE_CONFIDENCE: f32 = 0.5;

/// Bonus when the fragment carries an expiry keyword
pub const DEFAULT_KEYWORD_BONUS: f32 = 0.3;

/// Bonus for fully specified numeric and month-name shapes
pub const DEFAULT_STRONG_PATTERN_BONUS: f32 = 0.2;

/// Bonus for month-only shapes
pub const DEFAULT_WEAK_PATTERN_BONUS: f32 = 0.1;

/// Bonus for fragments with surrounding context
pub const DEFAULT_CONTEXT_BONUS: f32 = 0.1;

/// Fragments longer than this (chars) earn the context bonus
pub const DEFAULT_CONTEXT_MIN_LEN: usize = 20;

/// Confidence above which the cascade stops immediately
pub const DEFAULT_EARLY_EXIT_THRESHOLD: f32 = 0.85;

/// Confidence the best candidate must exceed to be returned
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f32 = 0.6;

// ============================================================
// Error Types
// ============================================================

/// Detector error types
///
/// Per-strategy failures are recovered internally; these variants are
/// contract violations or caller requests.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("OCR session is closed")]
    SessionClosed,

    #[error("Detection was cancelled")]
    Cancelled,

    #[error("Pattern table error: {0}")]
    Pattern(#[from] PatternError),
}

pub type Result<T> = std::result::Result<T, DetectorError>;

// ============================================================
// Core Data Structures
// ============================================================

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CandidateSource {
    /// A text span matched by a date pattern
    Pattern(PatternId),
    /// Digits read by the dot-matrix recognizer
    DotMatrix(DigitLayout),
}

/// A provisional date produced by one strategy pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCandidate {
    pub date: NaiveDate,
    /// Fragment text (or digit string) the date was read from
    pub source_text: String,
    /// Always within 0.0-1.0
    pub confidence: f32,
    /// Tag of the strategy that produced it
    pub strategy: String,
    pub source: CandidateSource,
}

/// What one strategy contributed to a detection call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub tag: String,
    pub method: ExtractionMethod,
    /// Not run (dot-matrix fallback after a date-shaped span was seen)
    pub skipped: bool,
    pub fragments: usize,
    pub spans: usize,
    pub candidates: usize,
    pub best_confidence: Option<f32>,
    pub elapsed_ms: f64,
}

impl StrategyOutcome {
    pub(crate) fn new(spec: &StrategySpec) -> Self {
        Self {
            tag: spec.tag.clone(),
            method: spec.method,
            skipped: false,
            fragments: 0,
            spans: 0,
            candidates: 0,
            best_confidence: None,
            elapsed_ms: 0.0,
        }
    }

    pub(crate) fn skipped(spec: &StrategySpec) -> Self {
        Self {
            skipped: true,
            ..Self::new(spec)
        }
    }
}

/// Full account of one detection call
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    /// Accepted date, if any
    pub date: Option<NaiveDate>,
    /// Accepted candidate, if any
    pub candidate: Option<DateCandidate>,
    /// Day the freshness rule was checked against
    pub today: NaiveDate,
    /// One entry per strategy reached, in cascade order
    pub outcomes: Vec<StrategyOutcome>,
    pub early_exit: bool,
    pub elapsed_ms: f64,
}

// ============================================================
// Options
// ============================================================

/// Confidence scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub base: f32,
    pub keyword_bonus: f32,
    pub strong_pattern_bonus: f32,
    pub weak_pattern_bonus: f32,
    pub context_bonus: f32,
    pub context_min_len: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_CONFIDENCE,
            keyword_bonus: DEFAULT_KEYWORD_BONUS,
            strong_pattern_bonus: DEFAULT_STRONG_PATTERN_BONUS,
            weak_pattern_bonus: DEFAULT_WEAK_PATTERN_BONUS,
            context_bonus: DEFAULT_CONTEXT_BONUS,
            context_min_len: DEFAULT_CONTEXT_MIN_LEN,
        }
    }
}

impl ScoreWeights {
    pub fn builder() -> ScoreWeightsBuilder {
        ScoreWeightsBuilder::default()
    }

    /// Re-apply the builder limits to values set directly
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::builder()
            .base(self.base)
            .keyword_bonus(self.keyword_bonus)
            .pattern_bonus(self.strong_pattern_bonus, self.weak_pattern_bonus)
            .context_bonus(self.context_bonus, self.context_min_len)
            .build()
    }
}

/// Builder for ScoreWeights
#[derive(Debug, Default)]
pub struct ScoreWeightsBuilder {
    weights: ScoreWeights,
}

impl ScoreWeightsBuilder {
    /// Set base confidence (clamped to 0.0-1.0)
    #[must_use]
    pub fn base(mut self, base: f32) -> Self {
        self.weights.base = base.clamp(0.0, 1.0);
        self
    }

    /// Set keyword bonus (clamped to 0.0-1.0)
    #[must_use]
    pub fn keyword_bonus(mut self, bonus: f32) -> Self {
        self.weights.keyword_bonus = bonus.clamp(0.0, 1.0);
        self
    }

    /// Set strong and weak pattern bonuses (each clamped to 0.0-1.0)
    #[must_use]
    pub fn pattern_bonus(mut self, strong: f32, weak: f32) -> Self {
        self.weights.strong_pattern_bonus = strong.clamp(0.0, 1.0);
        self.weights.weak_pattern_bonus = weak.clamp(0.0, 1.0);
        self
    }

    /// Set context bonus (clamped to 0.0-1.0) and the length that earns it
    #[must_use]
    pub fn context_bonus(mut self, bonus: f32, min_len: usize) -> Self {
        self.weights.context_bonus = bonus.clamp(0.0, 1.0);
        self.weights.context_min_len = min_len;
        self
    }

    #[must_use]
    pub fn build(self) -> ScoreWeights {
        self.weights
    }
}

/// Orchestrator options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Confidence above which the cascade returns immediately
    pub early_exit_threshold: f32,
    /// Confidence the final candidate must exceed
    pub acceptance_threshold: f32,
    pub weights: ScoreWeights,
    pub parse: ParseOptions,
    pub dot_matrix: DotMatrixOptions,
    /// Strategies in priority order
    pub strategies: Vec<StrategySpec>,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            early_exit_threshold: DEFAULT_EARLY_EXIT_THRESHOLD,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            weights: ScoreWeights::default(),
            parse: ParseOptions::default(),
            dot_matrix: DotMatrixOptions::default(),
            strategies: default_strategies(),
        }
    }
}

impl DetectorOptions {
    pub fn builder() -> DetectorOptionsBuilder {
        DetectorOptionsBuilder::default()
    }

    /// Short cascade for quick scans
    pub fn fast() -> Self {
        Self {
            strategies: fast_strategies(),
            ..Default::default()
        }
    }

    /// Day-first reading of ambiguous numeric dates
    pub fn day_first() -> Self {
        Self {
            parse: ParseOptions::day_first(),
            ..Default::default()
        }
    }
}

/// Builder for DetectorOptions
#[derive(Debug, Default)]
pub struct DetectorOptionsBuilder {
    options: DetectorOptions,
}

impl DetectorOptionsBuilder {
    /// Set early exit threshold (clamped to 0.0-1.0)
    #[must_use]
    pub fn early_exit_threshold(mut self, threshold: f32) -> Self {
        self.options.early_exit_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set acceptance threshold (clamped to 0.0-1.0)
    #[must_use]
    pub fn acceptance_threshold(mut self, threshold: f32) -> Self {
        self.options.acceptance_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set scoring weights (each field clamped as in its builder)
    #[must_use]
    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.options.weights = weights.clamped();
        self
    }

    /// Set parse options (year pivot clamped to 0-99)
    #[must_use]
    pub fn parse(mut self, parse: ParseOptions) -> Self {
        self.options.parse = parse.clamped();
        self
    }

    /// Set dot-matrix options (each field clamped as in its builder)
    #[must_use]
    pub fn dot_matrix(mut self, dot_matrix: DotMatrixOptions) -> Self {
        self.options.dot_matrix = dot_matrix.clamped();
        self
    }

    /// Replace the strategy table
    #[must_use]
    pub fn strategies(mut self, strategies: Vec<StrategySpec>) -> Self {
        self.options.strategies = strategies;
        self
    }

    #[must_use]
    pub fn build(self) -> DetectorOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_default() {
        let w = ScoreWeights::default();
        assert_eq!(w.base, 0.5);
        assert_eq!(w.keyword_bonus, 0.3);
        assert_eq!(w.strong_pattern_bonus, 0.2);
        assert_eq!(w.weak_pattern_bonus, 0.1);
        assert_eq!(w.context_bonus, 0.1);
        assert_eq!(w.context_min_len, 20);
    }

    #[test]
    fn test_weights_builder_clamping() {
        let w = ScoreWeights::builder()
            .base(1.4)
            .keyword_bonus(-0.2)
            .pattern_bonus(0.25, 2.0)
            .context_bonus(0.05, 30)
            .build();
        assert_eq!(w.base, 1.0);
        assert_eq!(w.keyword_bonus, 0.0);
        assert_eq!(w.strong_pattern_bonus, 0.25);
        assert_eq!(w.weak_pattern_bonus, 1.0);
        assert_eq!(w.context_min_len, 30);
    }

    #[test]
    fn test_options_default() {
        let opts = DetectorOptions::default();
        assert_eq!(opts.early_exit_threshold, 0.85);
        assert_eq!(opts.acceptance_threshold, 0.6);
        assert_eq!(opts.strategies.len(), 6);
        assert_eq!(opts.strategies[0].tag, "full-resolution");
    }

    #[test]
    fn test_options_presets() {
        assert!(DetectorOptions::fast().strategies.len() < 6);
        assert_eq!(
            DetectorOptions::day_first().parse.order,
            crate::date_parse::DayMonthOrder::DayFirst
        );
    }

    #[test]
    fn test_builder_clamping() {
        let opts = DetectorOptions::builder()
            .early_exit_threshold(1.5)
            .acceptance_threshold(-0.5)
            .strategies(Vec::new())
            .build();
        assert_eq!(opts.early_exit_threshold, 1.0);
        assert_eq!(opts.acceptance_threshold, 0.0);
        assert!(opts.strategies.is_empty());
    }

    #[test]
    fn test_builder_clamps_nested_options() {
        let opts = DetectorOptions::builder()
            .weights(ScoreWeights {
                base: 2.0,
                ..Default::default()
            })
            .parse(ParseOptions {
                year_pivot: 150,
                ..Default::default()
            })
            .dot_matrix(DotMatrixOptions {
                max_digits: 0,
                ..Default::default()
            })
            .build();
        assert_eq!(opts.weights.base, 1.0);
        assert_eq!(opts.weights.keyword_bonus, 0.3);
        assert_eq!(opts.parse.year_pivot, 99);
        assert_eq!(opts.dot_matrix.max_digits, 1);
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            DetectorError::SessionClosed.to_string(),
            "OCR session is closed"
        );
        assert!(DetectorError::Cancelled.to_string().contains("cancelled"));
    }

    #[test]
    fn test_candidate_source_serialize() {
        let json = serde_json::to_string(&CandidateSource::Pattern(PatternId::DottedTriplet))
            .unwrap();
        assert_eq!(json, r#"{"kind":"pattern","detail":"dotted_triplet"}"#);
    }

    #[test]
    fn test_skipped_outcome() {
        let spec = StrategySpec::dot_matrix("dots", Vec::new());
        let outcome = StrategyOutcome::skipped(&spec);
        assert!(outcome.skipped);
        assert_eq!(outcome.method, ExtractionMethod::DotMatrix);
        assert_eq!(outcome.best_confidence, None);
    }
}
