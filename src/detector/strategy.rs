//! Declarative strategy table
//!
//! A strategy is a transform chain plus the extraction method applied to the
//! rendered variant. The cascade tries strategies in table order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{
    apply_chain, ContrastPreset, ImageVariant, RawImage, Transform, DEFAULT_CROP_FRACTION,
    FAST_MAX_EDGE, HIGH_RES_MAX_EDGE,
};

/// How text is pulled out of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// General OCR followed by pattern matching
    Ocr,
    /// Dot-matrix digit recognizer, only when no date shape was seen yet
    DotMatrix,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Ocr => f.write_str("ocr"),
            ExtractionMethod::DotMatrix => f.write_str("dot-matrix"),
        }
    }
}

/// One `(transforms, method)` entry of the cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub tag: String,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    pub method: ExtractionMethod,
}

impl StrategySpec {
    pub fn ocr(tag: impl Into<String>, transforms: Vec<Transform>) -> Self {
        Self {
            tag: tag.into(),
            transforms,
            method: ExtractionMethod::Ocr,
        }
    }

    pub fn dot_matrix(tag: impl Into<String>, transforms: Vec<Transform>) -> Self {
        Self {
            tag: tag.into(),
            transforms,
            method: ExtractionMethod::DotMatrix,
        }
    }

    /// Render this strategy's variant of `raw`
    pub fn render(&self, raw: &RawImage) -> ImageVariant {
        apply_chain(raw, &self.transforms, &self.tag)
    }

    /// Transform names joined for display, `none` when empty
    pub fn describe_transforms(&self) -> String {
        if self.transforms.is_empty() {
            return "none".to_string();
        }
        self.transforms
            .iter()
            .map(Transform::name)
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Default cascade, most likely to succeed first
pub fn default_strategies() -> Vec<StrategySpec> {
    vec![
        StrategySpec::ocr("full-resolution", vec![Transform::scale(HIGH_RES_MAX_EDGE)]),
        StrategySpec::ocr(
            "center-crop-high-contrast",
            vec![
                Transform::center_crop(DEFAULT_CROP_FRACTION),
                Transform::contrast(ContrastPreset::High),
            ],
        ),
        StrategySpec::ocr(
            "enhanced-contrast",
            vec![
                Transform::center_crop(DEFAULT_CROP_FRACTION),
                Transform::contrast(ContrastPreset::Enhanced),
            ],
        ),
        StrategySpec::ocr(
            "adaptive-binarized",
            vec![Transform::scale(FAST_MAX_EDGE), Transform::adaptive_binarize()],
        ),
        StrategySpec::dot_matrix("dot-matrix", vec![Transform::scale(FAST_MAX_EDGE)]),
        StrategySpec::ocr("original", Vec::new()),
    ]
}

/// Reduced cascade: one downscaled OCR pass, one contrast pass, dot fallback
pub fn fast_strategies() -> Vec<StrategySpec> {
    vec![
        StrategySpec::ocr("fast", vec![Transform::scale(FAST_MAX_EDGE)]),
        StrategySpec::ocr(
            "fast-high-contrast",
            vec![
                Transform::scale(FAST_MAX_EDGE),
                Transform::contrast(ContrastPreset::High),
            ],
        ),
        StrategySpec::dot_matrix("dot-matrix", vec![Transform::scale(FAST_MAX_EDGE)]),
    ]
}
