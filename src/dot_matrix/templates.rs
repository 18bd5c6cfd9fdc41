//! 5x5 digit templates and synthetic dot-matrix rendering

use image::{GrayImage, Luma};

use super::types::{Glyph, GRID};

/// Dot layout of digits 0-9, `#` = dot
const DIGIT_ART: [[&str; GRID]; 10] = [
    ["#####", "#...#", "#...#", "#...#", "#####"],
    ["..#..", ".##..", "..#..", "..#..", ".###."],
    ["#####", "....#", "#####", "#....", "#####"],
    ["#####", "....#", "#####", "....#", "#####"],
    ["#...#", "#...#", "#####", "....#", "....#"],
    ["#####", "#....", "#####", "....#", "#####"],
    ["#####", "#....", "#####", "#...#", "#####"],
    ["#####", "....#", "...#.", "..#..", ".#..."],
    ["#####", "#...#", "#####", "#...#", "#####"],
    ["#####", "#...#", "#####", "....#", "#####"],
];

/// Template glyph for a digit, `None` above 9
pub fn digit_template(digit: u8) -> Option<Glyph> {
    let art = DIGIT_ART.get(digit as usize)?;
    let mut glyph = [[false; GRID]; GRID];
    for (row, line) in art.iter().enumerate() {
        for (col, ch) in line.chars().enumerate().take(GRID) {
            glyph[row][col] = ch == '#';
        }
    }
    Some(glyph)
}

/// Fraction of cells on which two glyphs agree
pub fn agreement(a: &Glyph, b: &Glyph) -> f32 {
    let same = a
        .iter()
        .flatten()
        .zip(b.iter().flatten())
        .filter(|(x, y)| x == y)
        .count();
    same as f32 / (GRID * GRID) as f32
}

/// Best matching digit and its agreement, if it exceeds `threshold`
///
/// Ties keep the lower digit.
pub fn match_digit(glyph: &Glyph, threshold: f32) -> Option<(u8, f32)> {
    let mut best: Option<(u8, f32)> = None;
    for digit in 0..10u8 {
        let Some(template) = digit_template(digit) else {
            continue;
        };
        let score = agreement(glyph, &template);
        if score > threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((digit, score));
        }
    }
    best
}

/// Geometry of synthetic dot-matrix print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotStyle {
    /// Cell pitch in pixels
    pub cell: u32,
    /// Square dot side in pixels, centered in its cell
    pub dot: u32,
    /// Blank pixels between digits
    pub gap: u32,
    /// Blank border around the print
    pub margin: u32,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            cell: 8,
            dot: 4,
            gap: 16,
            margin: 20,
        }
    }
}

/// Render digits as black dots on white, one 5x5 glyph per digit
///
/// Digits above 9 render as blank glyphs.
pub fn render_dot_digits(digits: &[u8], style: &DotStyle) -> GrayImage {
    let glyph_side = style.cell * GRID as u32;
    let count = digits.len() as u32;
    let width = 2 * style.margin + count * glyph_side + count.saturating_sub(1) * style.gap;
    let height = 2 * style.margin + glyph_side;
    let mut image = GrayImage::from_pixel(width, height, Luma([255]));

    let inset = style.cell.saturating_sub(style.dot) / 2;
    let dot = style.dot.min(style.cell);

    for (i, &digit) in digits.iter().enumerate() {
        let Some(glyph) = digit_template(digit) else {
            continue;
        };
        let origin_x = style.margin + i as u32 * (glyph_side + style.gap);
        for (row, cells) in glyph.iter().enumerate() {
            for (col, &on) in cells.iter().enumerate() {
                if !on {
                    continue;
                }
                let x0 = origin_x + col as u32 * style.cell + inset;
                let y0 = style.margin + row as u32 * style.cell + inset;
                for y in y0..y0 + dot {
                    for x in x0..x0 + dot {
                        image.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }
    }

    image
}
