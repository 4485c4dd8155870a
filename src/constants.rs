//! # System Constants
//!
//! Naming conventions, file names and record formats shared by the extraction
//! orchestrator, the output writer and the analysis pipeline.

/// Prefix that marks a measured numeric feature produced by the feature engine.
///
/// Keys without this prefix are diagnostics/metadata (versions, hashes, settings)
/// and are copied from the template row when a result has to be backfilled.
pub const MEASURED_FEATURE_PREFIX: &str = "original";

/// Value used for a measured feature that a failed sample never produced.
pub const BACKFILL_VALUE: f64 = 0.0;

/// File names and name stems used inside the output directory
pub mod files {
    pub const DEFAULT_OUTPUT_DIRECTORY: &str = "features";
    pub const DEFAULT_LOG_FILE: &str = "extraction_log.txt";
    pub const RESULTS_STEM: &str = "results";
    pub const CSV_EXTENSION: &str = "csv";
    pub const TXT_EXTENSION: &str = "txt";
    pub const JSON_EXTENSION: &str = "json";

    /// Suffix format for timestamped result files (`results-2024-01-31-12-00-00.csv`)
    pub const RESULTS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

    pub const CONFIG_FILE_NAMES: [&str; 2] = ["radiomics-batch.yaml", "radiomics-batch.yml"];
}

/// Log record layout
pub mod logging {
    /// Timestamp format for every log record (`2024-01-31 12:00:00`)
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Name given to each pool thread, suffixed with its 1-based index
    pub const WORKER_NAME_PREFIX: &str = "Worker";

    /// Name of the thread that drains the fan-in channel
    pub const FAN_IN_THREAD_NAME: &str = "log-fan-in";

    /// Name reported for threads that were spawned without one
    pub const UNNAMED_THREAD: &str = "Main";

    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
}

/// Environment variables consulted by the configuration loader
pub mod env {
    pub const ENVIRONMENT: &str = "RADIOMICS_BATCH_ENV";
    pub const ENVIRONMENT_FALLBACK: &str = "APP_ENV";
    pub const DEFAULT_ENVIRONMENT: &str = "development";
    pub const KNOWN_ENVIRONMENTS: [&str; 3] = ["development", "test", "production"];
}
