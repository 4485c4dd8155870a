//! # Feature Extraction Entry Point
//!
//! Runs one batch end to end:
//!
//! 1. register the batch with the [`ExtractionContext`] (new extraction or continuation)
//! 2. size the worker pool and install the run's logging (fan-in when concurrent)
//! 3. dispatch every sample through the feature engine, reporting progress
//! 4. reconcile the results into one rectangular table
//! 5. optionally write the result files
//!
//! Logging is torn down before `run` returns, whatever the outcome, so every record
//! of the run is on disk when the caller sees the result.

use std::sync::Arc;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::cancellation::CancellationToken;
use super::case_enumerator::enumerate_cases;
use super::context::ExtractionContext;
use super::progress::{ProgressReporter, ProgressUpdate};
use super::reconciler::{ReconciliationStats, ResultReconciler};
use super::types::FeatureExtractor;
use super::worker_pool::{DispatchOutcome, WorkerPool};
use crate::config::BatchConfig;
use crate::error::Result;
use crate::logging::{ActiveLogging, LoggingConfig};
use crate::models::{ReconciledTable, Sample};
use crate::output::{OutputWriter, WrittenOutputs};

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub table: ReconciledTable,
    pub stats: ReconciliationStats,
    pub pool_size: usize,
    /// Records went through the fan-in listener
    pub concurrent: bool,
    /// Present when result files were written
    pub outputs: Option<WrittenOutputs>,
}

/// A run stopped by its cancellation token; no table and no files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelledRun {
    pub run_id: Uuid,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Completed(ExtractionReport),
    Cancelled(CancelledRun),
}

impl ExtractionOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractionOutcome::Cancelled(_))
    }

    pub fn report(&self) -> Option<&ExtractionReport> {
        match self {
            ExtractionOutcome::Completed(report) => Some(report),
            ExtractionOutcome::Cancelled(_) => None,
        }
    }

    pub fn into_report(self) -> Option<ExtractionReport> {
        match self {
            ExtractionOutcome::Completed(report) => Some(report),
            ExtractionOutcome::Cancelled(_) => None,
        }
    }
}

/// Batch orchestrator bound to a configuration and a feature engine
pub struct FeatureExtraction {
    config: BatchConfig,
    extractor: Arc<dyn FeatureExtractor>,
}

impl FeatureExtraction {
    pub fn new(config: BatchConfig, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Extract features for `samples`
    ///
    /// `progress` is called on the calling thread with the cumulative number of
    /// finished items. Cancellation yields [`ExtractionOutcome::Cancelled`]; fatal
    /// infrastructure failures are errors. Failures of individual samples are
    /// neither: they are backfilled and counted in the report.
    pub fn run<'p>(
        &self,
        samples: Vec<Sample>,
        context: &mut ExtractionContext,
        progress: impl FnMut(ProgressUpdate) + Send + 'p,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        let run_id = Uuid::new_v4();
        let is_new = context.register_batch(&samples);
        let pool = WorkerPool::for_batch(&self.config.extraction, samples.len());

        let logging = LoggingConfig::new(
            &self.config.logging,
            self.config.log_file_path(),
            pool.is_concurrent(),
            is_new,
        )
        .install()?;

        let outcome = logging.in_scope(|| {
            let span = info_span!("extraction", run_id = %run_id);
            let _entered = span.enter();
            if !logging.has_log_file() {
                warn!(
                    log_file = %self.config.log_file_path().display(),
                    "Log file unavailable, log records go to stderr"
                );
            }
            self.execute(run_id, samples, pool, &logging, progress, cancel)
        });

        if let Some(report) = logging.shutdown() {
            if report.write_failures > 0 {
                warn!(
                    run_id = %run_id,
                    write_failures = report.write_failures,
                    "Some log records could not be written to the log file"
                );
            }
        }

        outcome
    }

    fn execute<'p>(
        &self,
        run_id: Uuid,
        samples: Vec<Sample>,
        pool: WorkerPool,
        logging: &ActiveLogging,
        progress: impl FnMut(ProgressUpdate) + Send + 'p,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        let total = samples.len();
        info!(
            run_id = %run_id,
            pool_size = pool.size(),
            "Processing batch of size {total}"
        );

        let items = enumerate_cases(samples);
        let mut reporter = ProgressReporter::new(total, progress);

        let results = match pool.dispatch(
            items,
            Arc::clone(&self.extractor),
            &mut reporter,
            cancel,
            logging.dispatch(),
        )? {
            DispatchOutcome::Completed(results) => results,
            DispatchOutcome::Cancelled { completed } => {
                info!(run_id = %run_id, completed, total, "Extraction cancelled");
                return Ok(ExtractionOutcome::Cancelled(CancelledRun {
                    run_id,
                    completed,
                    total,
                }));
            }
        };

        let reconciliation = ResultReconciler::from_config(&self.config.extraction).reconcile(&results)?;
        let stats = reconciliation.stats;
        info!(
            complete = stats.complete,
            backfilled = stats.backfilled,
            failed = stats.failed,
            "Reconciled {} results",
            results.len()
        );
        if stats.failed > 0 {
            warn!(
                failed = stats.failed,
                "Some samples failed and were backfilled from the template"
            );
        }

        let outputs = if self.config.output.enabled {
            Some(OutputWriter::from_config(&self.config.output).write(&reconciliation.table)?)
        } else {
            None
        };

        info!(run_id = %run_id, "Finished extraction successfully");

        Ok(ExtractionOutcome::Completed(ExtractionReport {
            run_id,
            table: reconciliation.table,
            stats,
            pool_size: pool.size(),
            concurrent: logging.is_fan_in_active(),
            outputs,
        }))
    }
}

impl std::fmt::Debug for FeatureExtraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtraction")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
