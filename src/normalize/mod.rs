//! Image Normalizer module
//!
//! Produces transformed renderings of a package photo so that each
//! recognition strategy sees an image tuned for it.
//!
//! # Features
//!
//! - Aspect-preserving downscale to a long-edge target
//! - Centered square crop
//! - Affine brightness/contrast presets plus an automatic preset
//! - Strided local-mean binarization (parallel rows)
//! - Dot connection via dilation for dot-matrix print
//!
//! # Example
//!
//! ```rust,no_run
//! use expiry_scan::{apply_chain, ContrastPreset, RawImage, Transform};
//! use std::path::Path;
//!
//! let raw = RawImage::open(Path::new("package.jpg")).unwrap();
//! let variant = apply_chain(
//!     &raw,
//!     &[Transform::center_crop(0.8), Transform::contrast(ContrastPreset::High)],
//!     "center-crop-high-contrast",
//! );
//! println!("{}: {}x{}", variant.tag, variant.image.width(), variant.image.height());
//! ```

mod transform;
mod types;

pub use transform::{
    adaptive_binarize, adaptive_contrast, apply, apply_chain, center_crop, choose_adaptive_preset,
    connect_dots, contrast, ink_mask, normalize, scale_down,
};
pub use types::{
    ContrastPreset, ImageVariant, NormalizeError, RawImage, Result, Transform,
    DEFAULT_BINARIZE_STRIDE, DEFAULT_BINARIZE_WINDOW, DEFAULT_CROP_FRACTION, DEFAULT_DOT_RADIUS,
    DEFAULT_INK_THRESHOLD, FAST_MAX_EDGE, HIGH_RES_MAX_EDGE,
};
