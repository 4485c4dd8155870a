//! Numeric feature table handed to the analysis pipeline.

use serde::{Deserialize, Serialize};

/// Feature names plus one row of values per sample
///
/// Values may be non-finite; [`super::FeatureDataset`] zeroes them before scaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(names: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    pub fn feature_count(&self) -> usize {
        self.names.len()
    }
}
