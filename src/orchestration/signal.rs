//! Async wrapper that cancels an extraction when a shutdown future resolves.
//!
//! The extraction itself is blocking and runs on tokio's blocking pool; the async
//! side only races it against the shutdown signal.

use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::cancellation::CancellationToken;
use super::context::ExtractionContext;
use super::extraction::{ExtractionOutcome, FeatureExtraction};
use super::progress::ProgressUpdate;
use super::worker_pool::DispatchError;
use crate::error::Result;
use crate::models::Sample;

/// Run `extraction` until it finishes or `shutdown` resolves
///
/// When `shutdown` wins the race the run is cancelled and this waits for the
/// coordinator to observe it, so the returned outcome is `Cancelled` unless the run
/// had already finished. `context` is updated exactly as a direct `run` would.
pub async fn extract_until_shutdown<S, P>(
    extraction: Arc<FeatureExtraction>,
    samples: Vec<Sample>,
    context: &mut ExtractionContext,
    progress: P,
    shutdown: S,
) -> Result<ExtractionOutcome>
where
    S: Future<Output = ()>,
    P: FnMut(ProgressUpdate) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let mut run_context = *context;

    let mut handle = tokio::task::spawn_blocking(move || {
        let outcome = extraction.run(samples, &mut run_context, progress, &run_cancel);
        (run_context, outcome)
    });

    tokio::pin!(shutdown);

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = &mut shutdown => {
            info!("Shutdown requested, cancelling extraction");
            cancel.cancel();
            handle.await
        }
    };

    let (updated_context, outcome) =
        joined.map_err(|e| DispatchError::CoordinatorPanicked(e.to_string()))?;
    *context = updated_context;
    outcome
}

/// [`extract_until_shutdown`] driven by Ctrl-C
pub async fn extract_until_interrupted<P>(
    extraction: Arc<FeatureExtraction>,
    samples: Vec<Sample>,
    context: &mut ExtractionContext,
    progress: P,
) -> Result<ExtractionOutcome>
where
    P: FnMut(ProgressUpdate) + Send + 'static,
{
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Without a signal handler the run can only finish on its own
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    extract_until_shutdown(extraction, samples, context, progress, interrupt).await
}
