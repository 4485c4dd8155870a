//! # Extraction Orchestration
//!
//! Drives a batch of samples through the external feature engine.
//!
//! ## Components
//!
//! - [`case_enumerator`]: tags samples with 1-based case ordinals
//! - [`worker_pool`]: sized thread pool with in-order result collection
//! - [`progress`] and [`cancellation`]: coordinator-side progress and cooperative stop
//! - [`reconciler`]: template selection and backfilling into a rectangular table
//! - [`context`]: high-water mark deciding new vs continued extractions
//! - [`extraction`]: the [`FeatureExtraction`] entry point tying it together
//! - [`signal`]: async wrapper cancelling a run on shutdown

pub mod cancellation;
pub mod case_enumerator;
pub mod context;
pub mod extraction;
pub mod progress;
pub mod reconciler;
pub mod signal;
pub mod types;
pub mod worker_pool;

pub use cancellation::CancellationToken;
pub use case_enumerator::enumerate_cases;
pub use context::ExtractionContext;
pub use extraction::{CancelledRun, ExtractionOutcome, ExtractionReport, FeatureExtraction};
pub use progress::{ProgressReporter, ProgressUpdate};
pub use reconciler::{ReconcileError, Reconciliation, ReconciliationStats, ResultReconciler};
pub use signal::{extract_until_interrupted, extract_until_shutdown};
pub use types::FeatureExtractor;
pub use worker_pool::{DispatchError, DispatchOutcome, WorkerPool};
