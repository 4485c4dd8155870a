//! # Error Types
//!
//! Crate-wide error aggregating the per-concern error enums so a batch run can
//! propagate any fatal failure with `?` while keeping the original cause attached.
//!
//! Domain failures of the feature engine are deliberately absent: they are recovered
//! per item and only show up in logs and in the reconciliation statistics.

use thiserror::Error;

use crate::analysis::{DatasetError, ProjectionError};
use crate::config::ConfigurationError;
use crate::logging::LoggingError;
use crate::orchestration::{DispatchError, ReconcileError};
use crate::output::OutputError;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconcileError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
}

pub type Result<T> = std::result::Result<T, BatchError>;
