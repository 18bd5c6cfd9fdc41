//! CLI argument definitions

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::CliOverrides;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NO_DATE_DETECTED: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
}

/// Expiry date recognition for food package photos
#[derive(Debug, Parser)]
#[command(name = "expiry-scan", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect the expiry date on a photo
    Scan(ScanArgs),
    /// Detect an expiry date in text fragments
    Parse(ParseArgs),
    /// Show the effective strategy table and thresholds
    Info(InfoArgs),
}

/// Options shared by detection commands
#[derive(Debug, Clone, Args)]
pub struct DetectionArgs {
    /// Day used for the freshness check (defaults to the local date)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Read ambiguous numeric dates day-first
    #[arg(long)]
    pub day_first: bool,

    /// Two-digit year pivot
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=99))]
    pub year_pivot: Option<u32>,

    /// Print a JSON report instead of the date
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl DetectionArgs {
    pub fn overrides(&self, fast: bool) -> CliOverrides {
        CliOverrides {
            day_first: self.day_first.then_some(true),
            year_pivot: self.year_pivot,
            fast,
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Photo to scan
    pub image: PathBuf,

    /// Text file whose lines stand in for the OCR result of every variant
    #[arg(long, value_name = "FILE")]
    pub ocr_text: Option<PathBuf>,

    /// Use the short strategy cascade
    #[arg(long)]
    pub fast: bool,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Text fragments, one per argument
    #[arg(required = true)]
    pub texts: Vec<String>,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Config file to show (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
