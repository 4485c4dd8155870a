//! Per-item outcome of running the feature engine.

use super::feature_map::FeatureMap;
use thiserror::Error;

/// Failure raised by the feature engine for a single sample
///
/// Domain failures are recovered locally: the item is tagged failed and later
/// backfilled by the reconciler. They never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DomainError {
    pub message: String,
}

impl DomainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why an item produced no features
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFailure {
    /// The feature engine rejected the sample
    Domain(DomainError),
    /// The feature engine panicked while processing the sample
    Panicked(String),
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemFailure::Domain(err) => write!(f, "domain failure: {err}"),
            ItemFailure::Panicked(msg) => write!(f, "feature engine panicked: {msg}"),
        }
    }
}

/// Outcome of one work item
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Succeeded(FeatureMap),
    Failed(ItemFailure),
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Succeeded(_))
    }

    /// Features of the item; a failed item contributes an empty map
    pub fn features(&self) -> FeatureMap {
        match self {
            ExtractionResult::Succeeded(map) => map.clone(),
            ExtractionResult::Failed(_) => FeatureMap::new(),
        }
    }

    pub fn feature_count(&self) -> usize {
        match self {
            ExtractionResult::Succeeded(map) => map.len(),
            ExtractionResult::Failed(_) => 0,
        }
    }
}

impl From<Result<FeatureMap, DomainError>> for ExtractionResult {
    fn from(result: Result<FeatureMap, DomainError>) -> Self {
        match result {
            Ok(map) => ExtractionResult::Succeeded(map),
            Err(err) => ExtractionResult::Failed(ItemFailure::Domain(err)),
        }
    }
}
