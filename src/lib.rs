#![allow(clippy::doc_markdown)] // Allow technical terms like PyRadiomics, t-SNE in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Radiomics Batch
//!
//! Batch orchestration for radiomics feature extraction and projection.
//!
//! ## Overview
//!
//! A batch of image/mask samples is dispatched to an external feature engine on a
//! bounded pool of worker threads. Per-sample results are reconciled into one
//! rectangular table (failed samples backfilled from a template row), optionally
//! written as CSV, text and JSON, and can then be standardized and projected into
//! a low-dimensional space per group of samples.
//!
//! ## Key Features
//!
//! - **Isolated failures**: a sample the feature engine rejects (or panics on) never
//!   aborts the batch; it is backfilled and counted
//! - **Ordered results**: rows come back in input order whatever the completion order
//! - **Cooperative cancellation**: a cancelled run reports `Cancelled`, never a partial table
//! - **Single-writer logging**: concurrent workers funnel log records through one
//!   listener thread into the extraction log
//!
//! ## Module Organization
//!
//! - [`models`] - Samples, work items, feature maps, per-item results, reconciled tables
//! - [`orchestration`] - Worker pool, progress, cancellation, reconciliation, entry point
//! - [`logging`] - Per-run tracing dispatch, record format, fan-in listener
//! - [`output`] - Result file writer and CSV reader
//! - [`analysis`] - Feature datasets, scaling, grouped projection, PCA
//! - [`config`] - YAML configuration with environment overrides
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use radiomics_batch::config::BatchConfig;
//! use radiomics_batch::models::{DomainError, FeatureMap, Sample, SampleId, WorkItem};
//! use radiomics_batch::orchestration::{
//!     CancellationToken, ExtractionContext, FeatureExtraction, FeatureExtractor,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = |item: &WorkItem| -> Result<FeatureMap, DomainError> {
//!     Ok(FeatureMap::from_iter([("original_shape_Volume", 1.0)]))
//! };
//! let extractor: Arc<dyn FeatureExtractor> = Arc::new(engine);
//! let extraction = FeatureExtraction::new(BatchConfig::default(), extractor);
//!
//! let samples = vec![Sample::new(SampleId::new(0, 0), "ct.nrrd", "mask.nrrd")];
//! let mut context = ExtractionContext::new();
//! let outcome = extraction.run(samples, &mut context, |_| {}, &CancellationToken::new())?;
//!
//! if let Some(report) = outcome.report() {
//!     println!("{} rows, {} backfilled", report.table.len(), report.stats.backfilled);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod output;

pub use analysis::{
    FeatureDataset, FeatureTable, GroupedProjector, PcaProjector, ProjectionResult, Projector,
    StandardScaler,
};
pub use config::{BatchConfig, ConfigManager};
pub use error::{BatchError, Result};
pub use models::{
    DomainError, ExtractionResult, FeatureMap, FeatureValue, ReconciledTable, Sample, SampleId,
    WorkItem,
};
pub use orchestration::{
    CancellationToken, ExtractionContext, ExtractionOutcome, ExtractionReport, FeatureExtraction,
    FeatureExtractor, ProgressUpdate,
};
pub use output::{read_csv_table, OutputWriter};
