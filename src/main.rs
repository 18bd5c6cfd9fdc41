//! expiry-scan - Expiry date recognition for food package photos
//!
//! CLI entry point

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{warn, Level};

use expiry_scan::{
    exit_codes,
    // CLI
    Cli, Commands, DetectionArgs, InfoArgs, ParseArgs, ScanArgs,
    // Config
    Config,
    // Detection
    DateCandidate, DetectionReport, DetectorOptions, ExpiryDateDetector, FixedClock,
    // Engines
    best_date_fragments, NoopEngine, OcrEngine, StaticTextEngine, TextFragment,
    // Input and monitoring
    PerformanceMonitor, PerformanceStats, RawImage,
};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Parse(args) => run_parse(&args),
        Commands::Info(args) => run_info(&args),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

/// Log to stderr so stdout stays machine-readable
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Explicit config file, or the user config (defaults when absent)
fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("Failed to load config file: {}", e);
        Config::default()
    })
}

fn detection_options(args: &DetectionArgs, fast: bool) -> DetectorOptions {
    load_config(args.config.as_deref()).merge_with_cli(&args.overrides(fast))
}

// ============ Scan Command ============

#[derive(Serialize)]
struct ScanOutput<'a> {
    image: String,
    report: &'a DetectionReport,
    performance: PerformanceStats,
}

fn run_scan(args: &ScanArgs) -> Result<i32> {
    if !args.image.exists() {
        eprintln!("Error: Input image does not exist: {}", args.image.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let photo = RawImage::open(&args.image)
        .with_context(|| format!("Failed to load {}", args.image.display()))?;

    let engine: Box<dyn OcrEngine> = match &args.ocr_text {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read OCR text {}", path.display()))?;
            Box::new(StaticTextEngine::from_text(&text))
        }
        None => Box::new(NoopEngine),
    };

    let options = detection_options(&args.detection, args.fast);
    let monitor = Arc::new(PerformanceMonitor::new());
    let mut detector =
        ExpiryDateDetector::open(engine, options)?.with_monitor(Arc::clone(&monitor));
    if let Some(today) = args.detection.today {
        detector = detector.with_clock(FixedClock(today));
    }

    let report = detector.detect_with_report(&photo)?;
    detector.close();

    if args.detection.json {
        let output = ScanOutput {
            image: args.image.display().to_string(),
            report: &report,
            performance: monitor.snapshot(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(candidate) = &report.candidate {
        print_candidate(candidate);
    } else {
        eprintln!("No expiry date detected");
    }

    Ok(outcome_code(report.date.is_some()))
}

// ============ Parse Command ============

#[derive(Serialize)]
struct ParseOutput<'a> {
    fragments: &'a [String],
    /// Date-like inputs, most confident first
    date_like: Vec<String>,
    candidate: Option<&'a DateCandidate>,
}

fn run_parse(args: &ParseArgs) -> Result<i32> {
    let options = detection_options(&args.detection, false);
    let mut detector = ExpiryDateDetector::open(NoopEngine, options)?;
    if let Some(today) = args.detection.today {
        detector = detector.with_clock(FixedClock(today));
    }

    let fragments: Vec<TextFragment> = args
        .texts
        .iter()
        .map(|text| TextFragment::new(text.as_str()))
        .collect();
    let candidate = detector.detect_in_fragments(&fragments);

    if args.detection.json {
        let output = ParseOutput {
            fragments: &args.texts,
            date_like: best_date_fragments(&fragments)
                .into_iter()
                .map(|f| f.text)
                .collect(),
            candidate: candidate.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(candidate) = &candidate {
        print_candidate(candidate);
    } else {
        eprintln!("No expiry date detected");
    }

    Ok(outcome_code(candidate.is_some()))
}

fn print_candidate(candidate: &DateCandidate) {
    println!("{}", candidate.date);
    tracing::debug!(
        strategy = %candidate.strategy,
        confidence = candidate.confidence,
        source = %candidate.source_text,
        "Accepted candidate"
    );
}

fn outcome_code(found: bool) -> i32 {
    if found {
        exit_codes::SUCCESS
    } else {
        exit_codes::NO_DATE_DETECTED
    }
}

// ============ Info Command ============

fn run_info(args: &InfoArgs) -> Result<i32> {
    let options = load_config(args.config.as_deref()).to_detector_options();

    println!("expiry-scan v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Thresholds:");
    println!("  Early exit: > {:.2}", options.early_exit_threshold);
    println!("  Acceptance: > {:.2}", options.acceptance_threshold);

    println!();
    println!("Scoring:");
    let w = &options.weights;
    println!("  Base:           {:.2}", w.base);
    println!("  Keyword:        +{:.2}", w.keyword_bonus);
    println!("  Strong pattern: +{:.2}", w.strong_pattern_bonus);
    println!("  Weak pattern:   +{:.2}", w.weak_pattern_bonus);
    println!(
        "  Context:        +{:.2} (> {} chars)",
        w.context_bonus, w.context_min_len
    );

    println!();
    println!("Parsing:");
    println!("  Order:      {:?}", options.parse.order);
    println!("  Year pivot: {}", options.parse.year_pivot);

    println!();
    println!("Strategies:");
    for (i, spec) in options.strategies.iter().enumerate() {
        println!(
            "  {}. {:<28} {:<11} {}",
            i + 1,
            spec.tag,
            spec.method.to_string(),
            spec.describe_transforms()
        );
    }

    println!();
    println!("Config File Locations:");
    match Config::default_path() {
        Some(path) => println!("  User: {}", path.display()),
        None => println!("  User: (no config directory)"),
    }

    Ok(exit_codes::SUCCESS)
}
