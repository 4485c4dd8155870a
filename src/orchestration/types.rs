//! Seam between the orchestrator and the external feature engine.

use crate::models::{DomainError, FeatureMap, WorkItem};

/// The feature-computation engine: one sample in, one ordered feature map out
///
/// Implementations are shared across pool threads, so they must be `Send + Sync`
/// and must not rely on per-call mutable state outside the item they receive.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, item: &WorkItem) -> Result<FeatureMap, DomainError>;
}

impl<F> FeatureExtractor for F
where
    F: Fn(&WorkItem) -> Result<FeatureMap, DomainError> + Send + Sync,
{
    fn extract(&self, item: &WorkItem) -> Result<FeatureMap, DomainError> {
        self(item)
    }
}
