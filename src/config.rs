//! Configuration file support
//!
//! Reads `config.toml` into the detector options. Every section is optional;
//! missing values keep their defaults. Command-line flags override file
//! values through [`CliOverrides`].
//!
//! ```toml
//! [detector]
//! early_exit_threshold = 0.9
//!
//! [parse]
//! order = "day-first"
//!
//! [[strategies]]
//! tag = "crop"
//! method = "ocr"
//! transforms = [{ kind = "center_crop", fraction = 0.6 }]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::date_parse::{DayMonthOrder, ParseOptions};
use crate::detector::{DetectorOptions, ScoreWeights, StrategySpec};
use crate::dot_matrix::DotMatrixOptions;

/// Directory under the platform config dir
const CONFIG_DIR_NAME: &str = "expiry-scan";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Cascade thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub early_exit_threshold: f32,
    pub acceptance_threshold: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let defaults = DetectorOptions::default();
        Self {
            early_exit_threshold: defaults.early_exit_threshold,
            acceptance_threshold: defaults.acceptance_threshold,
        }
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: ThresholdConfig,
    pub parse: ParseOptions,
    pub dot_matrix: DotMatrixOptions,
    pub scoring: ScoreWeights,
    /// Replaces the default cascade when present
    pub strategies: Option<Vec<StrategySpec>>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub day_first: Option<bool>,
    pub year_pivot: Option<u32>,
    pub early_exit_threshold: Option<f32>,
    pub acceptance_threshold: Option<f32>,
    pub fast: bool,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, defaults when no file exists
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> DetectorOptions {
        let mut parse = self.parse;
        if let Some(day_first) = cli.day_first {
            parse.order = if day_first {
                DayMonthOrder::DayFirst
            } else {
                DayMonthOrder::MonthFirst
            };
        }

        let mut builder = DetectorOptions::builder()
            .early_exit_threshold(
                cli.early_exit_threshold
                    .unwrap_or(self.detector.early_exit_threshold),
            )
            .acceptance_threshold(
                cli.acceptance_threshold
                    .unwrap_or(self.detector.acceptance_threshold),
            )
            .weights(self.scoring)
            .dot_matrix(self.dot_matrix);

        builder = match cli.year_pivot {
            Some(pivot) => builder.parse(
                ParseOptions::builder()
                    .order(parse.order)
                    .year_pivot(pivot)
                    .build(),
            ),
            None => builder.parse(parse),
        };

        if cli.fast {
            builder = builder.strategies(DetectorOptions::fast().strategies);
        } else if let Some(strategies) = &self.strategies {
            builder = builder.strategies(strategies.clone());
        }

        builder.build()
    }

    /// Options from the file alone
    pub fn to_detector_options(&self) -> DetectorOptions {
        self.merge_with_cli(&CliOverrides::default())
    }
}
