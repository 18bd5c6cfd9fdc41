//! Dot-matrix date recognition
//!
//! # Algorithm
//!
//! 1. Binarize and dilate so dots of one stroke merge
//! 2. Scan rows for long dark runs made of several ink runs (number lines)
//!    and merge touching rows into regions
//! 3. Split each region into equal-width digit slots
//! 4. Sample each slot on a 5x5 grid and match it against the digit templates
//! 5. Read the digits with fixed MMDDYYYY / DDMMYYYY / YYYYMMDD layouts
//!    (six-digit variants for six digits) and keep the first future date

use chrono::NaiveDate;
use image::{DynamicImage, GrayImage};
use tracing::{debug, trace};

use super::templates::match_digit;
use super::types::{
    DigitLayout, DigitRegion, DotMatrixMatch, DotMatrixOptions, Glyph, GRID, MIN_DATE_DIGITS,
    MIN_REGION_HEIGHT,
};
use crate::date_parse::{ensure_future, expand_two_digit_year, ymd, DEFAULT_YEAR_PIVOT};
use crate::normalize::connect_dots;

/// Digits read from one region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDigits {
    pub region: DigitRegion,
    pub digits: Vec<u8>,
    /// Template agreement per recognized digit
    pub scores: Vec<f32>,
}

/// Dot-matrix date recognizer
#[derive(Debug, Clone, Default)]
pub struct DotMatrixRecognizer {
    options: DotMatrixOptions,
}

impl DotMatrixRecognizer {
    pub fn new(options: DotMatrixOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DotMatrixOptions {
        &self.options
    }

    /// Find a future date printed in dot-matrix digits
    pub fn detect_date(&self, image: &DynamicImage, today: NaiveDate) -> Option<DotMatrixMatch> {
        for found in self.recognize_digits(image) {
            if found.digits.len() < MIN_DATE_DIGITS {
                trace!(
                    digits = found.digits.len(),
                    "Too few digits in region, skipping"
                );
                continue;
            }
            if let Some((date, layout)) = assemble_date(&found.digits, today) {
                let agreement = found.scores.iter().sum::<f32>() / found.scores.len() as f32;
                debug!(%date, layout = layout.label(), "Dot-matrix date recognized");
                return Some(DotMatrixMatch {
                    date,
                    digits: found.digits,
                    layout,
                    region: found.region,
                    agreement,
                });
            }
        }
        None
    }

    /// Recognize digits in every candidate region, top to bottom
    pub fn recognize_digits(&self, image: &DynamicImage) -> Vec<RegionDigits> {
        if image.width() == 0 || image.height() == 0 {
            return Vec::new();
        }

        let connected = connect_dots(
            &image.to_luma8(),
            self.options.connect_radius,
            self.options.ink_threshold,
        );

        self.find_regions(&connected)
            .into_iter()
            .map(|region| {
                let mut digits = Vec::new();
                let mut scores = Vec::new();
                for glyph in self.sample_slots(&connected, &region) {
                    if let Some((digit, score)) = match_digit(&glyph, self.options.match_threshold)
                    {
                        digits.push(digit);
                        scores.push(score);
                    }
                }
                trace!(?region, ?digits, "Region digits");
                RegionDigits {
                    region,
                    digits,
                    scores,
                }
            })
            .collect()
    }

    /// Locate number lines in a binarized image (black ink on white)
    pub fn find_regions(&self, binary: &GrayImage) -> Vec<DigitRegion> {
        let (width, height) = binary.dimensions();
        let opts = &self.options;
        let mut bands: Vec<Band> = Vec::new();

        for y in 0..height {
            for (start, end) in line_segments(binary, y, opts) {
                let mut merged = Band {
                    x0: start,
                    x1: end,
                    y0: y,
                    y1: y,
                };
                // absorb every band this segment touches
                let mut i = 0;
                while i < bands.len() {
                    if bands[i].touches(&merged) {
                        merged = merged.union(&bands.swap_remove(i));
                    } else {
                        i += 1;
                    }
                }
                bands.push(merged);
            }
        }

        bands.sort_by_key(|b| (b.y0, b.x0));
        bands
            .into_iter()
            .map(|band| grow_vertically(binary, band))
            .filter_map(|band| {
                let x0 = band.x0.saturating_sub(opts.padding_x);
                let y0 = band.y0.saturating_sub(opts.padding_y);
                let x1 = (band.x1 + opts.padding_x).min(width);
                let y1 = (band.y1 + 1 + opts.padding_y).min(height);
                let padded = DigitRegion {
                    x: x0,
                    y: y0,
                    width: x1 - x0,
                    height: y1 - y0,
                };
                let trimmed = trim_to_ink(binary, &padded)?;
                (trimmed.height >= MIN_REGION_HEIGHT).then_some(trimmed)
            })
            .fold(Vec::new(), |mut regions, region| {
                if !regions.contains(&region) {
                    regions.push(region);
                }
                regions
            })
    }

    /// Split a region into digit slots and sample each on the template grid
    pub fn sample_slots(&self, binary: &GrayImage, region: &DigitRegion) -> Vec<Glyph> {
        let glyph_height = region.height as f32;
        let components = ink_columns(binary, region);
        let (Some(first), Some(last)) = (components.first(), components.last()) else {
            return Vec::new();
        };

        // narrow glyphs (e.g. "1") occupy a full-width cell centered on their ink
        let widen = |(start, end): (u32, u32)| -> (f32, f32) {
            let (s, e) = (start as f32, end as f32);
            if e - s < glyph_height {
                let center = (s + e) / 2.0;
                (center - glyph_height / 2.0, center + glyph_height / 2.0)
            } else {
                (s, e)
            }
        };
        let line_start = widen(*first).0;
        let line_end = widen(*last).1;
        let line_width = line_end - line_start;

        let gap = glyph_height * self.options.gap_ratio;
        let pitch = glyph_height + gap;
        let slots = (((line_width + gap) / pitch).round() as usize)
            .clamp(1, self.options.max_digits.max(1));
        let slot_pitch = (line_width + gap) / slots as f32;
        let slot_width = slot_pitch * glyph_height / pitch;

        (0..slots)
            .map(|i| {
                let x0 = line_start + i as f32 * slot_pitch;
                sample_glyph(
                    binary,
                    x0,
                    x0 + slot_width,
                    region.y as f32,
                    region.bottom() as f32,
                )
            })
            .collect()
    }
}

/// Read digits with the fixed layouts and return the first future date
pub fn assemble_date(digits: &[u8], today: NaiveDate) -> Option<(NaiveDate, DigitLayout)> {
    if digits.len() < MIN_DATE_DIGITS {
        return None;
    }
    DigitLayout::for_len(digits.len())
        .iter()
        .find_map(|&layout| {
            let (year, month, day) = layout_fields(digits, layout)?;
            let date = ymd(year, month, day).ok()?;
            ensure_future(date, today).ok().map(|d| (d, layout))
        })
}

/// Split digits into (year, month, day) according to a layout
pub fn layout_fields(digits: &[u8], layout: DigitLayout) -> Option<(i32, u32, u32)> {
    let num = |range: std::ops::Range<usize>| -> Option<u32> {
        digits
            .get(range)
            .map(|ds| ds.iter().fold(0u32, |acc, &d| acc * 10 + d as u32))
    };
    let short_year = |v: u32| expand_two_digit_year(v, DEFAULT_YEAR_PIVOT);

    match (layout, digits.len()) {
        (DigitLayout::Mmddyyyy, 8) => Some((num(4..8)? as i32, num(0..2)?, num(2..4)?)),
        (DigitLayout::Ddmmyyyy, 8) => Some((num(4..8)? as i32, num(2..4)?, num(0..2)?)),
        (DigitLayout::Yyyymmdd, 8) => Some((num(0..4)? as i32, num(4..6)?, num(6..8)?)),
        (DigitLayout::Mmddyy, 6) => Some((short_year(num(4..6)?), num(0..2)?, num(2..4)?)),
        (DigitLayout::Ddmmyy, 6) => Some((short_year(num(4..6)?), num(2..4)?, num(0..2)?)),
        (DigitLayout::Yymmdd, 6) => Some((short_year(num(0..2)?), num(2..4)?, num(4..6)?)),
        _ => None,
    }
}

/// Inclusive-exclusive horizontal extent plus inclusive row extent
#[derive(Debug, Clone, Copy)]
struct Band {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl Band {
    fn touches(&self, other: &Band) -> bool {
        let rows = other.y0 <= self.y1 + 1 && self.y0 <= other.y1 + 1;
        let cols = other.x0 < self.x1 && self.x0 < other.x1;
        rows && cols
    }

    fn union(&self, other: &Band) -> Band {
        Band {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            y0: self.y0.min(other.y0),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Extend a band up and down while the rows above/below still carry ink
///
/// Rows of a glyph with few dots (e.g. the stem of "4") do not qualify as
/// number lines on their own but belong to the same region.
fn grow_vertically(binary: &GrayImage, mut band: Band) -> Band {
    let row_has_ink = |y: u32| (band.x0..band.x1).any(|x| is_ink(binary, x, y));
    while band.y0 > 0 && row_has_ink(band.y0 - 1) {
        band.y0 -= 1;
    }
    while band.y1 + 1 < binary.height() && row_has_ink(band.y1 + 1) {
        band.y1 += 1;
    }
    band
}

#[inline]
fn is_ink(binary: &GrayImage, x: u32, y: u32) -> bool {
    binary.get_pixel(x, y).0[0] < 128
}

/// Number-line segments of one row as `(start, end)` pixel ranges
fn line_segments(binary: &GrayImage, y: u32, opts: &DotMatrixOptions) -> Vec<(u32, u32)> {
    let width = binary.width();
    let mut segments = Vec::new();
    let mut current: Option<(u32, u32, u32)> = None; // start, end, ink runs
    let mut x = 0;

    while x < width {
        if !is_ink(binary, x, y) {
            x += 1;
            continue;
        }
        let run_start = x;
        while x < width && is_ink(binary, x, y) {
            x += 1;
        }
        current = match current {
            Some((start, end, runs)) if run_start - end <= opts.max_gap => {
                Some((start, x, runs + 1))
            }
            Some(done) => {
                push_segment(&mut segments, done, opts);
                Some((run_start, x, 1))
            }
            None => Some((run_start, x, 1)),
        };
    }
    if let Some(done) = current {
        push_segment(&mut segments, done, opts);
    }
    segments
}

fn push_segment(
    segments: &mut Vec<(u32, u32)>,
    (start, end, runs): (u32, u32, u32),
    opts: &DotMatrixOptions,
) {
    if end - start >= opts.min_span && runs >= opts.min_dots {
        segments.push((start, end));
    }
}

/// Shrink a region to the bounding box of its ink
fn trim_to_ink(binary: &GrayImage, region: &DigitRegion) -> Option<DigitRegion> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            if is_ink(binary, x, y) {
                bounds = Some(match bounds {
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    None => (x, y, x, y),
                });
            }
        }
    }
    bounds.map(|(x0, y0, x1, y1)| DigitRegion {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Runs of columns containing ink, as `(start, end)` ranges
fn ink_columns(binary: &GrayImage, region: &DigitRegion) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut start: Option<u32> = None;
    for x in region.x..region.right() {
        let has_ink = (region.y..region.bottom()).any(|y| is_ink(binary, x, y));
        match (has_ink, start) {
            (true, None) => start = Some(x),
            (false, Some(s)) => {
                runs.push((s, x));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, region.right()));
    }
    runs
}

/// Sample a slot on the 5x5 grid; a cell is a dot when at least half its
/// pixels are ink
fn sample_glyph(binary: &GrayImage, x0: f32, x1: f32, y0: f32, y1: f32) -> Glyph {
    let (width, height) = binary.dimensions();
    let cell_w = (x1 - x0) / GRID as f32;
    let cell_h = (y1 - y0) / GRID as f32;
    let mut glyph = [[false; GRID]; GRID];

    for (row, cells) in glyph.iter_mut().enumerate() {
        let py0 = (y0 + row as f32 * cell_h).round().max(0.0) as u32;
        let py1 = ((y0 + (row + 1) as f32 * cell_h).round().max(0.0) as u32)
            .min(height)
            .max(py0 + 1);
        for (col, cell) in cells.iter_mut().enumerate() {
            let px0 = (x0 + col as f32 * cell_w).round().max(0.0) as u32;
            let px1 = ((x0 + (col + 1) as f32 * cell_w).round().max(0.0) as u32)
                .min(width)
                .max(px0 + 1);

            let mut ink = 0u32;
            let mut total = 0u32;
            for y in py0..py1.min(height) {
                for x in px0..px1.min(width) {
                    total += 1;
                    if is_ink(binary, x, y) {
                        ink += 1;
                    }
                }
            }
            *cell = total > 0 && ink * 2 >= total;
        }
    }
    glyph
}
