//! # Worker Pool
//!
//! Fixed-size pool of named OS threads that runs the feature engine over a batch.
//!
//! The coordinating thread (the caller of [`WorkerPool::dispatch`]) owns result
//! collection and progress: workers only pull jobs from a shared queue and push
//! `(position, result)` pairs back over a completion channel. Results are written
//! into their input slot, so the returned vector is in input order whatever order
//! the workers finished in.
//!
//! The feature engine is CPU-bound and blocking, which is why the pool uses threads
//! and crossbeam channels rather than the async runtime.

use crossbeam::channel::{self, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error, info, warn, Dispatch};

use super::cancellation::CancellationToken;
use super::progress::ProgressReporter;
use super::types::FeatureExtractor;
use crate::config::ExtractionConfig;
use crate::constants::logging::WORKER_NAME_PREFIX;
use crate::models::{ExtractionResult, ItemFailure, WorkItem};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to spawn worker thread {worker}: {source}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("All workers exited after {completed} of {expected} items")]
    WorkersLost { completed: usize, expected: usize },

    #[error("Extraction coordinator panicked: {0}")]
    CoordinatorPanicked(String),
}

/// Result of a dispatch
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Every item finished; one result per item, in input order
    Completed(Vec<ExtractionResult>),
    /// Cancellation was observed; in-flight items were abandoned
    Cancelled { completed: usize },
}

type Job = (usize, WorkItem);
type Completion = (usize, ExtractionResult);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// Size the pool for a batch using the configured CPU budget
    pub fn for_batch(config: &ExtractionConfig, item_count: usize) -> Self {
        Self::with_cpu_budget(config.cpu_budget(), item_count)
    }

    /// `max(1, min(cpu_budget - 1, item_count))`: one CPU stays with the coordinator
    pub fn with_cpu_budget(cpu_budget: usize, item_count: usize) -> Self {
        let size = cpu_budget.saturating_sub(1).min(item_count).max(1);
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// A single-worker pool runs inline on the coordinating thread
    pub fn is_concurrent(&self) -> bool {
        self.size > 1
    }

    /// Run every item through `extractor`
    ///
    /// `dispatch` is the run's tracing dispatch; every worker thread enters it so its
    /// records reach the same sinks as the coordinator's. Cancellation is checked
    /// before each item in sequential mode and after each completion in concurrent
    /// mode.
    pub fn dispatch(
        &self,
        items: Vec<WorkItem>,
        extractor: Arc<dyn FeatureExtractor>,
        progress: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
        dispatch: &Dispatch,
    ) -> Result<DispatchOutcome, DispatchError> {
        if items.is_empty() {
            return Ok(DispatchOutcome::Completed(Vec::new()));
        }

        if self.is_concurrent() {
            self.dispatch_concurrent(items, extractor, progress, cancel, dispatch)
        } else {
            Ok(dispatch_sequential(items, extractor.as_ref(), progress, cancel))
        }
    }

    fn dispatch_concurrent(
        &self,
        items: Vec<WorkItem>,
        extractor: Arc<dyn FeatureExtractor>,
        progress: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
        dispatch: &Dispatch,
    ) -> Result<DispatchOutcome, DispatchError> {
        let total = items.len();
        debug!(pool_size = self.size, total, "Starting concurrent dispatch");

        let (job_tx, job_rx) = channel::unbounded::<Job>();
        for job in items.into_iter().enumerate() {
            // The receiver is alive in this scope, so sending cannot fail
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (done_tx, done_rx) = channel::unbounded::<Completion>();
        let abort = Arc::new(AtomicBool::new(false));
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.size);

        for worker in 1..=self.size {
            let jobs = job_rx.clone();
            let done = done_tx.clone();
            let extractor = Arc::clone(&extractor);
            let cancel = cancel.clone();
            let abort_flag = Arc::clone(&abort);
            let worker_dispatch = dispatch.clone();

            let spawned = thread::Builder::new()
                .name(format!("{WORKER_NAME_PREFIX}-{worker}"))
                .spawn(move || {
                    tracing::dispatcher::with_default(&worker_dispatch, || {
                        worker_loop(extractor.as_ref(), &jobs, &done, &cancel, &abort_flag)
                    })
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    error!(worker, error = %source, "Failed to spawn worker thread");
                    abort.store(true, Ordering::SeqCst);
                    return Err(DispatchError::WorkerSpawn { worker, source });
                }
            }
        }
        drop(done_tx);
        drop(job_rx);

        let mut slots: Vec<Option<ExtractionResult>> = (0..total).map(|_| None).collect();
        let mut completed = 0;

        while completed < total {
            if cancel.is_cancelled() {
                info!(
                    completed,
                    total, "Cancellation requested, abandoning in-flight items"
                );
                // Workers are detached; they stop at their next cancellation check
                drop(handles);
                return Ok(DispatchOutcome::Cancelled { completed });
            }

            crossbeam::select! {
                recv(done_rx) -> message => match message {
                    Ok((position, result)) => {
                        slots[position] = Some(result);
                        completed += 1;
                        progress.advance();
                    }
                    Err(_) => {
                        error!(completed, total, "Completion channel closed early");
                        return Err(DispatchError::WorkersLost {
                            completed,
                            expected: total,
                        });
                    }
                },
                recv(cancel.notified()) -> _ => {}
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                warn!("Worker thread exited abnormally");
            }
        }

        Ok(DispatchOutcome::Completed(
            slots.into_iter().flatten().collect(),
        ))
    }
}

fn dispatch_sequential(
    items: Vec<WorkItem>,
    extractor: &dyn FeatureExtractor,
    progress: &mut ProgressReporter<'_>,
    cancel: &CancellationToken,
) -> DispatchOutcome {
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        if cancel.is_cancelled() {
            info!(completed = results.len(), "Cancellation requested");
            return DispatchOutcome::Cancelled {
                completed: results.len(),
            };
        }
        results.push(run_item(extractor, &item));
        progress.advance();
    }

    DispatchOutcome::Completed(results)
}

fn worker_loop(
    extractor: &dyn FeatureExtractor,
    jobs: &Receiver<Job>,
    done: &Sender<Completion>,
    cancel: &CancellationToken,
    abort: &AtomicBool,
) {
    debug!("Worker started");

    while !cancel.is_cancelled() && !abort.load(Ordering::SeqCst) {
        let Ok((position, item)) = jobs.recv() else {
            break;
        };
        let result = run_item(extractor, &item);
        if done.send((position, result)).is_err() {
            // Coordinator stopped collecting
            break;
        }
    }

    debug!("Worker finished");
}

/// Run the feature engine on one item, turning domain errors and panics into failures
pub(crate) fn run_item(extractor: &dyn FeatureExtractor, item: &WorkItem) -> ExtractionResult {
    info!("Processing Case-{}: {}", item.ordinal, item.id());

    match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(item))) {
        Ok(Ok(features)) => {
            debug!(
                case = item.ordinal,
                feature_count = features.len(),
                "Case-{} extracted",
                item.ordinal
            );
            ExtractionResult::Succeeded(features)
        }
        Ok(Err(err)) => {
            warn!(
                "Feature extraction failed for Case-{} {}: {}",
                item.ordinal,
                item.id(),
                err
            );
            ExtractionResult::Failed(ItemFailure::Domain(err))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                "Feature engine panicked on Case-{} {}: {}",
                item.ordinal,
                item.id(),
                message
            );
            ExtractionResult::Failed(ItemFailure::Panicked(message))
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
