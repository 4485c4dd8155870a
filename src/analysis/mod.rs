//! # Feature Analysis
//!
//! Sequential post-processing of reconciled results: numeric feature tables,
//! the concatenated and standardized dataset, and grouped low-dimensional projection.

pub mod feature_dataset;
pub mod feature_table;
pub mod pca;
pub mod projection;
pub mod scaling;

pub use feature_dataset::{DatasetError, FeatureDataset};
pub use feature_table::FeatureTable;
pub use pca::PcaProjector;
pub use projection::{GroupedProjector, ProjectionError, ProjectionResult, Projector};
pub use scaling::{Scaler, StandardScaler};
