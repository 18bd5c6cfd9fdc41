//! Pixel transforms
//!
//! Every function here is pure: it reads an image and returns a new one.
//! A zero-area input yields a zero-area output instead of an error.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use rayon::prelude::*;

use super::types::{
    ContrastPreset, ImageVariant, RawImage, Transform, LOCAL_THRESHOLD_MAX, LOCAL_THRESHOLD_MIN,
};

/// Mean gray level below which an image counts as dark
const DARK_MEAN: f32 = 100.0;

/// Gray range below which an image counts as low contrast
const LOW_CONTRAST_RANGE: u8 = 50;

/// Render one transform of the raw photo
pub fn normalize(raw: &RawImage, transform: &Transform) -> ImageVariant {
    apply_chain(raw, std::slice::from_ref(transform), transform.name())
}

/// Render a transform chain of the raw photo, applied left to right
///
/// An empty chain yields the photo itself.
pub fn apply_chain(raw: &RawImage, transforms: &[Transform], tag: &str) -> ImageVariant {
    if raw.is_empty() {
        return ImageVariant::empty(tag);
    }

    let mut image = raw.to_dynamic();
    for transform in transforms {
        image = apply(&image, transform);
        if image.width() == 0 || image.height() == 0 {
            return ImageVariant::empty(tag);
        }
    }
    ImageVariant::new(image, tag)
}

/// Apply a single transform to an already decoded image
pub fn apply(image: &DynamicImage, transform: &Transform) -> DynamicImage {
    if image.width() == 0 || image.height() == 0 {
        return DynamicImage::new_luma8(0, 0);
    }

    match *transform {
        Transform::Scale { max_edge } => scale_down(image, max_edge),
        Transform::CenterCrop { fraction } => center_crop(image, fraction),
        Transform::Contrast { preset } => DynamicImage::ImageLuma8(contrast(image, preset)),
        Transform::AdaptiveContrast => DynamicImage::ImageLuma8(adaptive_contrast(image)),
        Transform::AdaptiveBinarize { window, stride } => {
            DynamicImage::ImageLuma8(adaptive_binarize(&image.to_luma8(), window, stride))
        }
        Transform::ConnectDots { radius, threshold } => {
            DynamicImage::ImageLuma8(connect_dots(&image.to_luma8(), radius, threshold))
        }
    }
}

/// Downsample so the longer edge is at most `max_edge`, keeping aspect ratio
pub fn scale_down(image: &DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let long_edge = width.max(height);
    if max_edge == 0 || long_edge <= max_edge {
        return image.clone();
    }

    let ratio = max_edge as f64 / long_edge as f64;
    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

/// Centered square of side `fraction * min(width, height)`
pub fn center_crop(image: &DynamicImage, fraction: f32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let side = ((width.min(height) as f32) * fraction.clamp(0.0, 1.0)).round() as u32;
    if side == 0 {
        return DynamicImage::new_luma8(0, 0);
    }

    let x = (width - side) / 2;
    let y = (height - side) / 2;
    image.crop_imm(x, y, side, side)
}

/// Grayscale with `clamp(gray * gain + bias, 0, 255)`
pub fn contrast(image: &DynamicImage, preset: ContrastPreset) -> GrayImage {
    let (gain, bias) = preset.gain_bias();
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = affine(pixel.0[0], gain, bias);
    }
    gray
}

#[inline]
fn affine(value: u8, gain: f32, bias: f32) -> u8 {
    (value as f32 * gain + bias).round().clamp(0.0, 255.0) as u8
}

/// Pick a contrast preset from the gray-level mean and range
///
/// Dark images get a brightening bias, flat images a steeper gain.
pub fn choose_adaptive_preset(gray: &GrayImage) -> ContrastPreset {
    let mut sum = 0u64;
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in gray.pixels() {
        let v = pixel.0[0];
        sum += v as u64;
        min = min.min(v);
        max = max.max(v);
    }

    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let mean = sum as f32 / count as f32;
    let range = max.saturating_sub(min);

    if mean < DARK_MEAN {
        ContrastPreset::Custom {
            gain: 1.6,
            bias: 40.0,
        }
    } else if range < LOW_CONTRAST_RANGE {
        ContrastPreset::Custom {
            gain: 2.0,
            bias: 20.0,
        }
    } else {
        ContrastPreset::Custom {
            gain: 1.4,
            bias: 25.0,
        }
    }
}

/// Grayscale with an automatically chosen contrast preset
pub fn adaptive_contrast(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let (gain, bias) = choose_adaptive_preset(&gray).gain_bias();
    let mut out = gray;
    for pixel in out.pixels_mut() {
        pixel.0[0] = affine(pixel.0[0], gain, bias);
    }
    out
}

/// Local-mean thresholding
///
/// For every pixel the mean of the `(2 * window + 1)^2` neighbourhood is
/// sampled every `stride` pixels, clamped to 70-200, and the pixel becomes
/// black when darker than that threshold. Rows are processed in parallel.
pub fn adaptive_binarize(gray: &GrayImage, window: u32, stride: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(0, 0);
    }

    let w = width as usize;
    let h = height as i64;
    let window = window.max(1) as i64;
    let stride = stride.max(1) as usize;
    let src = gray.as_raw();
    let mut out = vec![255u8; w * height as usize];

    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let y = y as i64;
        for (x, dst) in row.iter_mut().enumerate() {
            let x = x as i64;
            let mut sum = 0u64;
            let mut count = 0u64;
            for dy in (-window..=window).step_by(stride) {
                let sy = y + dy;
                if sy < 0 || sy >= h {
                    continue;
                }
                for dx in (-window..=window).step_by(stride) {
                    let sx = x + dx;
                    if sx < 0 || sx >= w as i64 {
                        continue;
                    }
                    sum += src[sy as usize * w + sx as usize] as u64;
                    count += 1;
                }
            }

            let mean = if count > 0 { sum / count } else { 128 };
            let threshold = (mean as u8).clamp(LOCAL_THRESHOLD_MIN, LOCAL_THRESHOLD_MAX);
            let value = src[y as usize * w + x as usize];
            *dst = if value < threshold { 0 } else { 255 };
        }
    });

    GrayImage::from_raw(width, height, out).unwrap_or_else(|| GrayImage::new(0, 0))
}

/// Binarize at `threshold` and grow ink by `radius` so dot-matrix glyphs
/// become connected strokes
///
/// Output is black ink on a white background.
pub fn connect_dots(gray: &GrayImage, radius: u8, threshold: u8) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return GrayImage::new(0, 0);
    }

    let mut mask = ink_mask(gray, threshold);
    if radius > 0 {
        mask = dilate(&mask, Norm::LInf, radius);
    }
    for pixel in mask.pixels_mut() {
        pixel.0[0] = 255 - pixel.0[0];
    }
    mask
}

/// White (255) where the source is darker than `threshold`, black elsewhere
pub fn ink_mask(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(gray.width(), gray.height());
    for (src, dst) in gray.pixels().zip(mask.pixels_mut()) {
        *dst = if src.0[0] < threshold {
            Luma([255])
        } else {
            Luma([0])
        };
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, value: u8) -> RawImage {
        RawImage::from_rgba(RgbaImage::from_pixel(
            width,
            height,
            Rgba([value, value, value, 255]),
        ))
    }

    #[test]
    fn test_scale_down_keeps_aspect() {
        let raw = solid(4000, 2000, 200);
        let variant = normalize(&raw, &Transform::scale(1600));
        assert_eq!(variant.image.width(), 1600);
        assert_eq!(variant.image.height(), 800);
    }

    #[test]
    fn test_scale_never_upsamples() {
        let raw = solid(300, 200, 200);
        let variant = normalize(&raw, &Transform::scale(1600));
        assert_eq!(variant.image.dimensions(), (300, 200));
    }

    #[test]
    fn test_center_crop_square() {
        let raw = solid(1000, 500, 200);
        let variant = normalize(&raw, &Transform::center_crop(0.8));
        assert_eq!(variant.image.dimensions(), (400, 400));
    }

    #[test]
    fn test_contrast_is_clamped() {
        let raw = solid(4, 4, 200);
        let variant = normalize(&raw, &Transform::contrast(ContrastPreset::Enhanced));
        let gray = variant.image.to_luma8();
        assert!(gray.pixels().all(|p| p.0[0] == 255));

        let dark = solid(4, 4, 10);
        let variant = normalize(&dark, &Transform::contrast(ContrastPreset::Mild));
        assert!(variant.image.to_luma8().pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_adaptive_preset_selection() {
        let dark = GrayImage::from_pixel(8, 8, Luma([40]));
        assert_eq!(
            choose_adaptive_preset(&dark),
            ContrastPreset::Custom {
                gain: 1.6,
                bias: 40.0
            }
        );

        let flat = GrayImage::from_pixel(8, 8, Luma([180]));
        assert_eq!(
            choose_adaptive_preset(&flat),
            ContrastPreset::Custom {
                gain: 2.0,
                bias: 20.0
            }
        );

        let mut varied = GrayImage::from_pixel(8, 8, Luma([220]));
        varied.put_pixel(0, 0, Luma([0]));
        assert_eq!(
            choose_adaptive_preset(&varied),
            ContrastPreset::Custom {
                gain: 1.4,
                bias: 25.0
            }
        );
    }

    #[test]
    fn test_adaptive_binarize_separates_ink() {
        let mut gray = GrayImage::from_pixel(60, 60, Luma([230]));
        for y in 25..35 {
            for x in 25..35 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        let binary = adaptive_binarize(&gray, 15, 3);
        assert_eq!(binary.get_pixel(30, 30).0[0], 0);
        assert_eq!(binary.get_pixel(2, 2).0[0], 255);
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_connect_dots_bridges_gap() {
        let mut gray = GrayImage::from_pixel(20, 10, Luma([255]));
        gray.put_pixel(5, 5, Luma([0]));
        gray.put_pixel(9, 5, Luma([0]));
        let joined = connect_dots(&gray, 2, 128);
        for x in 5..=9 {
            assert_eq!(joined.get_pixel(x, 5).0[0], 0, "x={x}");
        }
        assert_eq!(joined.get_pixel(15, 5).0[0], 255);
    }

    #[test]
    fn test_zero_size_input_yields_empty() {
        let raw = solid(0, 0, 0);
        for transform in [
            Transform::scale(1600),
            Transform::center_crop(0.8),
            Transform::contrast(ContrastPreset::High),
            Transform::AdaptiveContrast,
            Transform::adaptive_binarize(),
            Transform::connect_dots(2),
        ] {
            assert!(normalize(&raw, &transform).is_empty());
        }
    }

    #[test]
    fn test_chain_order_and_tag() {
        let raw = solid(2000, 1000, 120);
        let variant = apply_chain(
            &raw,
            &[
                Transform::center_crop(0.8),
                Transform::contrast(ContrastPreset::High),
            ],
            "center-crop-high-contrast",
        );
        assert_eq!(variant.tag, "center-crop-high-contrast");
        assert_eq!(variant.image.dimensions(), (800, 800));
        assert_eq!(variant.image.to_luma8().get_pixel(0, 0).0[0], 216);
    }

    #[test]
    fn test_raw_image_untouched() {
        let raw = solid(10, 10, 100);
        let _ = normalize(&raw, &Transform::contrast(ContrastPreset::Enhanced));
        assert_eq!(raw.as_rgba().get_pixel(0, 0).0[0], 100);
    }
}
