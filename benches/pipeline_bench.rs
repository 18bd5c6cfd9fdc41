//! Pipeline benchmarks
//!
//! Pattern matching, adaptive binarization and dot-matrix recognition.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, GrayImage, Luma};

use expiry_scan::normalize::adaptive_binarize;
use expiry_scan::{render_dot_digits, DatePatternSet, DotMatrixRecognizer, DotStyle};

fn bench_pattern_matching(c: &mut Criterion) {
    let patterns = DatePatternSet::standard().unwrap();
    let texts = [
        "EXP 12/25/2026",
        "best before 03.04.27 L4471-22",
        "NET WT 200g INGREDIENTS: WATER, SUGAR, SALT",
        "Use by 3rd March 2026",
    ];

    let mut group = c.benchmark_group("find_date_spans");
    for text in texts {
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, text| {
            b.iter(|| patterns.find_date_spans(black_box(text)))
        });
    }
    group.finish();
}

fn bench_adaptive_binarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_binarize");
    for size in [400u32, 1600] {
        let gray = GrayImage::from_fn(size, size * 3 / 4, |x, y| {
            Luma([((x * 7 + y * 3) % 256) as u8])
        });
        group.bench_with_input(BenchmarkId::from_parameter(size), &gray, |b, gray| {
            b.iter(|| adaptive_binarize(black_box(gray), 15, 3))
        });
    }
    group.finish();
}

fn bench_dot_matrix(c: &mut Criterion) {
    let recognizer = DotMatrixRecognizer::default();
    let image = DynamicImage::ImageLuma8(render_dot_digits(
        &[1, 2, 3, 1, 2, 0, 3, 0],
        &DotStyle::default(),
    ));
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

    c.bench_function("dot_matrix_detect_date", |b| {
        b.iter(|| recognizer.detect_date(black_box(&image), today))
    });
}

criterion_group!(
    benches,
    bench_pattern_matching,
    bench_adaptive_binarize,
    bench_dot_matrix
);
criterion_main!(benches);
