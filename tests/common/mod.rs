//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use expiry_scan::{
    render_dot_digits, DotStyle, FixedClock, OcrEngine, OcrError, RawImage, TextBlock,
};
use image::{DynamicImage, Rgba, RgbaImage};

/// One scripted engine response
#[derive(Debug, Clone)]
pub enum Reply {
    Lines(Vec<&'static str>),
    Fail,
}

/// Engine answering each `recognize` call with the next scripted reply,
/// then with no text once the script runs out
#[derive(Debug)]
pub struct ScriptedEngine {
    replies: Vec<Reply>,
    calls: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            calls: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of `recognize` calls, readable after the engine moved
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Counter of `release` calls, readable after the engine moved
    pub fn releases(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&mut self, _image: &DynamicImage) -> expiry_scan::ocr::Result<Vec<TextBlock>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(call) {
            Some(Reply::Lines(lines)) => {
                Ok(lines.iter().map(|l| TextBlock::single_line(*l)).collect())
            }
            Some(Reply::Fail) => Err(OcrError::EngineFailure("corrupt buffer".to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Plain light-gray photo
pub fn blank_photo() -> RawImage {
    RawImage::from_rgba(RgbaImage::from_pixel(120, 90, Rgba([235, 235, 235, 255])))
}

/// Photo of dot-matrix printed digits
pub fn dot_photo(digits: &[u8]) -> RawImage {
    let gray = render_dot_digits(digits, &DotStyle::default());
    RawImage::from_dynamic(DynamicImage::ImageLuma8(gray))
}

pub fn clock(year: i32, month: u32, day: u32) -> FixedClock {
    FixedClock::ymd(year, month, day).unwrap()
}
