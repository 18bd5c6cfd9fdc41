//! Candidate confidence scoring

use super::types::ScoreWeights;
use crate::date_pattern::{contains_expiry_keyword, PatternId, PatternStrength};

/// Confidence of a date read from `fragment` with `pattern`
///
/// `base + keyword + pattern strength + context`, clamped to 0.0-1.0.
pub fn score_fragment(fragment: &str, pattern: PatternId, weights: &ScoreWeights) -> f32 {
    let mut score = weights.base;

    if contains_expiry_keyword(fragment) {
        score += weights.keyword_bonus;
    }

    score += match pattern.strength() {
        PatternStrength::Strong => weights.strong_pattern_bonus,
        PatternStrength::Weak => weights.weak_pattern_bonus,
    };

    if fragment.chars().count() > weights.context_min_len {
        score += weights.context_bonus;
    }

    score.clamp(0.0, 1.0)
}

/// Confidence of a dot-matrix date: a full eight- or six-digit layout
/// counts as a strong pattern without keyword context
pub fn score_dot_matrix(weights: &ScoreWeights) -> f32 {
    (weights.base + weights.strong_pattern_bonus).clamp(0.0, 1.0)
}
