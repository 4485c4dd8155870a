pub mod extraction_result;
pub mod feature_map;
pub mod reconciled_table;
pub mod sample;

// Re-export core models for easy access
pub use extraction_result::{DomainError, ExtractionResult, ItemFailure};
pub use feature_map::{FeatureMap, FeatureValue};
pub use reconciled_table::{HeaderMismatch, ReconciledTable};
pub use sample::{Sample, SampleId, WorkItem};
