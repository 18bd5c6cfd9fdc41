//! Image Normalizer core types
//!
//! Contains the immutable input photo, the per-strategy variant and the
//! declarative transform description used by the strategy table.

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Long-edge target for the full-resolution OCR pass
pub const HIGH_RES_MAX_EDGE: u32 = 3072;

/// Long-edge target for the faster passes
pub const FAST_MAX_EDGE: u32 = 1600;

/// Smallest accepted long-edge target
pub const MIN_MAX_EDGE: u32 = 256;

/// Largest accepted long-edge target
pub const MAX_MAX_EDGE: u32 = 8192;

/// Default center crop fraction of the shorter dimension
pub const DEFAULT_CROP_FRACTION: f32 = 0.8;

/// Center crop fraction clamp range
pub const MIN_CROP_FRACTION: f32 = 0.1;
pub const MAX_CROP_FRACTION: f32 = 1.0;

/// Adaptive binarization half-window (pixels)
pub const DEFAULT_BINARIZE_WINDOW: u32 = 15;

/// Adaptive binarization sampling stride (pixels)
pub const DEFAULT_BINARIZE_STRIDE: u32 = 3;

/// Local thresholds are clamped into this range
pub const LOCAL_THRESHOLD_MIN: u8 = 70;
pub const LOCAL_THRESHOLD_MAX: u8 = 200;

/// Dot connection dilation radius (pixels)
pub const DEFAULT_DOT_RADIUS: u8 = 2;

/// Largest accepted dot connection radius
pub const MAX_DOT_RADIUS: u8 = 8;

/// Gray level below which a pixel counts as ink
pub const DEFAULT_INK_THRESHOLD: u8 = 128;

// ============================================================
// Error Types
// ============================================================

/// Image normalization error types
///
/// Transforms themselves never fail; these cover loading the photo.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

// ============================================================
// Core Data Structures
// ============================================================

/// Immutable photo handed to the detector
///
/// Pixels are shared, never mutated; every transform produces a new image.
#[derive(Debug, Clone)]
pub struct RawImage {
    pixels: Arc<RgbaImage>,
}

impl RawImage {
    /// Wrap an RGBA buffer
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Convert any decoded image
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba(image.into_rgba8())
    }

    /// Decode an encoded image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image =
            image::load_from_memory(bytes).map_err(|e| NormalizeError::Decode(e.to_string()))?;
        Ok(Self::from_dynamic(image))
    }

    /// Load and decode an image file
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NormalizeError::ImageNotFound(path.to_path_buf()));
        }
        let image = image::open(path).map_err(|e| NormalizeError::Decode(e.to_string()))?;
        Ok(Self::from_dynamic(image))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// True for a zero-area image
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Borrow the pixel grid
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Owned copy as a `DynamicImage`
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.pixels.as_ref().clone())
    }
}

/// One rendering of the input photo, tagged with the strategy that produced it
#[derive(Debug, Clone)]
pub struct ImageVariant {
    /// Rendered pixels
    pub image: DynamicImage,
    /// Producing strategy (e.g. "center-crop-high-contrast")
    pub tag: String,
}

impl ImageVariant {
    pub fn new(image: DynamicImage, tag: impl Into<String>) -> Self {
        Self {
            image,
            tag: tag.into(),
        }
    }

    /// Zero-area variant, treated downstream as "no detection"
    pub fn empty(tag: impl Into<String>) -> Self {
        Self::new(DynamicImage::new_luma8(0, 0), tag)
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// Brightness/contrast presets, `out = clamp(gray * gain + bias, 0, 255)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContrastPreset {
    /// Slight boost with darkening bias
    Mild,
    /// Strong gain for clear print
    #[default]
    High,
    /// Maximum gain for faint print
    Enhanced,
    /// Preset tuned for neural OCR engines
    NeuralTuned,
    /// Keeps isolated dots visible
    DottedText,
    /// Explicit gain and bias
    Custom { gain: f32, bias: f32 },
}

impl ContrastPreset {
    /// Gain and bias of the affine transform
    pub fn gain_bias(&self) -> (f32, f32) {
        match self {
            ContrastPreset::Mild => (1.3, -20.0),
            ContrastPreset::High => (1.8, 0.0),
            ContrastPreset::Enhanced => (2.5, 0.0),
            ContrastPreset::NeuralTuned => (1.5, 30.0),
            ContrastPreset::DottedText => (1.8, 35.0),
            ContrastPreset::Custom { gain, bias } => {
                (gain.clamp(0.0, 10.0), bias.clamp(-255.0, 255.0))
            }
        }
    }
}

/// A single pure pixel transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Downsample so the longer edge fits `max_edge` (no-op when already smaller)
    Scale { max_edge: u32 },
    /// Centered square covering `fraction` of the shorter dimension
    CenterCrop { fraction: f32 },
    /// Grayscale followed by an affine brightness/contrast preset
    Contrast { preset: ContrastPreset },
    /// Grayscale with a preset chosen from the image's brightness statistics
    AdaptiveContrast,
    /// Local-mean thresholding sampled on a stride
    AdaptiveBinarize { window: u32, stride: u32 },
    /// Binarize and dilate ink so neighbouring dots merge into strokes
    ConnectDots { radius: u8, threshold: u8 },
}

impl Transform {
    /// Scale with the target clamped to a sane range
    pub fn scale(max_edge: u32) -> Self {
        Transform::Scale {
            max_edge: max_edge.clamp(MIN_MAX_EDGE, MAX_MAX_EDGE),
        }
    }

    /// Center crop with the fraction clamped to 0.1-1.0
    pub fn center_crop(fraction: f32) -> Self {
        Transform::CenterCrop {
            fraction: fraction.clamp(MIN_CROP_FRACTION, MAX_CROP_FRACTION),
        }
    }

    pub fn contrast(preset: ContrastPreset) -> Self {
        Transform::Contrast { preset }
    }

    /// Adaptive binarization with the default window and stride
    pub fn adaptive_binarize() -> Self {
        Transform::AdaptiveBinarize {
            window: DEFAULT_BINARIZE_WINDOW,
            stride: DEFAULT_BINARIZE_STRIDE,
        }
    }

    /// Dot connection with the radius clamped to 1-8
    pub fn connect_dots(radius: u8) -> Self {
        Transform::ConnectDots {
            radius: radius.clamp(1, MAX_DOT_RADIUS),
            threshold: DEFAULT_INK_THRESHOLD,
        }
    }

    /// Short name used in variant tags and logs
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Scale { .. } => "scale",
            Transform::CenterCrop { .. } => "center-crop",
            Transform::Contrast { .. } => "contrast",
            Transform::AdaptiveContrast => "adaptive-contrast",
            Transform::AdaptiveBinarize { .. } => "adaptive-binarize",
            Transform::ConnectDots { .. } => "connect-dots",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_image_dimensions() {
        let raw = RawImage::from_rgba(RgbaImage::new(40, 20));
        assert_eq!(raw.width(), 40);
        assert_eq!(raw.height(), 20);
        assert!(!raw.is_empty());
        assert!(RawImage::from_rgba(RgbaImage::new(0, 10)).is_empty());
    }

    #[test]
    fn test_raw_image_clone_shares_pixels() {
        let raw = RawImage::from_rgba(RgbaImage::new(8, 8));
        let copy = raw.clone();
        assert!(std::ptr::eq(raw.as_rgba(), copy.as_rgba()));
    }

    #[test]
    fn test_raw_image_open_missing() {
        let result = RawImage::open(Path::new("/nonexistent/photo.png"));
        assert!(matches!(result, Err(NormalizeError::ImageNotFound(_))));
    }

    #[test]
    fn test_raw_image_from_garbage_bytes() {
        let result = RawImage::from_bytes(b"not an image");
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn test_empty_variant() {
        let variant = ImageVariant::empty("none");
        assert!(variant.is_empty());
        assert_eq!(variant.tag, "none");
    }

    #[test]
    fn test_contrast_presets() {
        assert_eq!(ContrastPreset::Mild.gain_bias(), (1.3, -20.0));
        assert_eq!(ContrastPreset::High.gain_bias(), (1.8, 0.0));
        assert_eq!(ContrastPreset::Enhanced.gain_bias(), (2.5, 0.0));
        assert_eq!(ContrastPreset::NeuralTuned.gain_bias(), (1.5, 30.0));
        assert_eq!(ContrastPreset::DottedText.gain_bias(), (1.8, 35.0));
        let custom = ContrastPreset::Custom {
            gain: 50.0,
            bias: -900.0,
        };
        assert_eq!(custom.gain_bias(), (10.0, -255.0));
    }

    #[test]
    fn test_transform_constructor_clamping() {
        assert_eq!(Transform::scale(10), Transform::Scale { max_edge: 256 });
        assert_eq!(
            Transform::scale(100_000),
            Transform::Scale { max_edge: 8192 }
        );
        assert_eq!(
            Transform::center_crop(2.0),
            Transform::CenterCrop { fraction: 1.0 }
        );
        assert_eq!(
            Transform::center_crop(0.0),
            Transform::CenterCrop { fraction: 0.1 }
        );
        assert_eq!(
            Transform::connect_dots(0),
            Transform::ConnectDots {
                radius: 1,
                threshold: DEFAULT_INK_THRESHOLD
            }
        );
    }

    #[test]
    fn test_transform_serde_roundtrip_shape() {
        let toml_text = r#"kind = "contrast"
preset = "enhanced"
"#;
        let transform: Transform = toml::from_str(toml_text).unwrap();
        assert_eq!(transform, Transform::contrast(ContrastPreset::Enhanced));
    }

    #[test]
    fn test_error_types() {
        let _err1 = NormalizeError::ImageNotFound(PathBuf::from("/test"));
        let _err2 = NormalizeError::Decode("bad".to_string());
        let _err3: NormalizeError = std::io::Error::other("test").into();
    }
}
