//! # Batch Configuration System
//!
//! YAML-based configuration for extraction runs, logging, output and projection.
//! Every section has documented defaults so a missing file section never silently
//! produces an unusable run; loaded values are validated before use.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use radiomics_batch::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let manager = ConfigManager::load()?;
//!
//! let dimensions = manager.config().projection.dimensions;
//! let log_file = manager.config().log_file_path();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

use crate::constants::{files, logging, MEASURED_FEATURE_PREFIX};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Deserialize a log level written as `trace|debug|info|warn|error|off`
fn deserialize_level<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = String::deserialize(deserializer)?;
    LevelFilter::from_str(value.trim())
        .map_err(|_| D::Error::custom(format!("Unknown log level '{value}'")))
}

fn serialize_level<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string().to_lowercase())
}

/// Root configuration structure mirroring radiomics-batch.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker pool and reconciliation settings
    pub extraction: ExtractionConfig,

    /// Log sinks and severity thresholds
    pub logging: LoggingSettings,

    /// Result file emission
    pub output: OutputConfig,

    /// Dataset scaling and projection
    pub projection: ProjectionConfig,
}

/// Worker pool and reconciliation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Overrides the detected CPU count when sizing the pool
    pub available_cpus: Option<usize>,
    /// Name prefix that marks measured (numeric) features
    pub measured_prefix: String,
    /// Append keys found only in non-template rows as extra columns
    pub keep_extra_columns: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            available_cpus: None,
            measured_prefix: MEASURED_FEATURE_PREFIX.to_string(),
            keep_extra_columns: false,
        }
    }
}

impl ExtractionConfig {
    /// CPU budget for the pool: the override when set, otherwise the detected parallelism
    pub fn cpu_budget(&self) -> usize {
        self.available_cpus.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Log sinks and severity thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum severity written to the log file
    #[serde(
        deserialize_with = "deserialize_level",
        serialize_with = "serialize_level"
    )]
    pub file_level: LevelFilter,
    /// Minimum severity mirrored to the console (stderr)
    #[serde(
        deserialize_with = "deserialize_level",
        serialize_with = "serialize_level"
    )]
    pub console_level: LevelFilter,
    /// Log file name, relative to the output directory
    pub log_file_name: String,
    /// Capacity of the bounded fan-in channel used in concurrent mode
    pub channel_capacity: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_level: LevelFilter::INFO,
            console_level: LevelFilter::ERROR,
            log_file_name: files::DEFAULT_LOG_FILE.to_string(),
            channel_capacity: logging::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl LoggingSettings {
    /// Most verbose of the two sink thresholds
    ///
    /// `LevelFilter` orders verbosity upwards (`TRACE > ERROR`), so the effective
    /// minimum severity is the maximum filter.
    pub fn effective_level(&self) -> LevelFilter {
        std::cmp::max(self.file_level, self.console_level)
    }
}

/// Result file emission
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write result files at the end of a successful extraction
    pub enabled: bool,
    /// Directory receiving result files and the extraction log
    pub directory: PathBuf,
    pub write_csv: bool,
    pub write_txt: bool,
    pub write_json: bool,
    /// Suffix result files with the run timestamp instead of overwriting `results.*`
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from(files::DEFAULT_OUTPUT_DIRECTORY),
            write_csv: true,
            write_txt: true,
            write_json: true,
            timestamped: false,
        }
    }
}

/// Dataset scaling and projection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Target dimensionality of projected coordinates
    pub dimensions: usize,
    /// Scale columns to unit variance after centering
    pub scale_variance: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            dimensions: 2,
            scale_variance: true,
        }
    }
}

impl BatchConfig {
    /// Full path of the extraction log file
    pub fn log_file_path(&self) -> PathBuf {
        self.output.directory.join(&self.logging.log_file_name)
    }

    /// Validate values that deserialize fine but cannot drive a run
    pub fn validate(&self) -> ConfigResult<()> {
        if self.extraction.available_cpus == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "extraction.available_cpus",
                "0",
                "CPU budget must be at least 1 when set",
            ));
        }

        if self.logging.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "logging.channel_capacity",
                "0",
                "Fan-in channel must be able to hold at least one record",
            ));
        }

        if self.logging.log_file_name.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "logging.log_file_name",
                self.logging.log_file_name.clone(),
                "Log file name cannot be empty",
            ));
        }

        if self.projection.dimensions == 0 {
            return Err(ConfigurationError::invalid_value(
                "projection.dimensions",
                "0",
                "Projection needs at least one output dimension",
            ));
        }

        Ok(())
    }
}
