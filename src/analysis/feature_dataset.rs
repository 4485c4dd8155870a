//! # Feature Dataset
//!
//! Concatenates one or more feature tables (one per group) into a single matrix.
//! Row order is group-major, state-minor, and each row carries the
//! [`SampleId`] `(table index, row index within table)` it came from.

use ndarray::Array2;
use thiserror::Error;
use tracing::debug;

use super::feature_table::FeatureTable;
use super::scaling::{Scaler, StandardScaler};
use crate::models::{ReconciledTable, SampleId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Cannot build a dataset from zero tables")]
    NoTables,

    #[error("Feature tables contain no samples")]
    NoSamples,

    #[error("Feature tables contain no features")]
    NoFeatures,

    #[error("Table {table} differs in number, order or names of features")]
    FeatureNameMismatch { table: usize },

    #[error("Row {row} of table {table} has {actual} values, expected {expected}")]
    RowWidth {
        table: usize,
        row: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FeatureDataset {
    feature_names: Vec<String>,
    sample_ids: Vec<SampleId>,
    original: Array2<f64>,
    scaled: Array2<f64>,
}

impl FeatureDataset {
    /// Build the dataset and scale it with `scaler`
    ///
    /// Non-finite values are replaced with zero in both retained matrices.
    pub fn new(tables: &[FeatureTable], scaler: &dyn Scaler) -> Result<Self, DatasetError> {
        let first = tables.first().ok_or(DatasetError::NoTables)?;
        let feature_names = first.names().to_vec();
        if feature_names.is_empty() {
            return Err(DatasetError::NoFeatures);
        }
        let width = feature_names.len();

        let mut sample_ids = Vec::new();
        let mut flat = Vec::new();

        for (group_index, table) in tables.iter().enumerate() {
            if table.names() != feature_names.as_slice() {
                return Err(DatasetError::FeatureNameMismatch { table: group_index });
            }

            for (state_index, row) in table.values().iter().enumerate() {
                if row.len() != width {
                    return Err(DatasetError::RowWidth {
                        table: group_index,
                        row: state_index,
                        expected: width,
                        actual: row.len(),
                    });
                }
                flat.extend(
                    row.iter()
                        .map(|&value| if value.is_finite() { value } else { 0.0 }),
                );
                sample_ids.push(SampleId::new(group_index, state_index));
            }
        }

        if sample_ids.is_empty() {
            return Err(DatasetError::NoSamples);
        }

        let rows = sample_ids.len();
        let original = Array2::from_shape_vec((rows, width), flat)
            .map_err(|_| DatasetError::NoSamples)?;
        let scaled = scaler.scale(&original);

        debug!(
            samples = rows,
            features = width,
            groups = tables.len(),
            "Built feature dataset"
        );

        Ok(Self {
            feature_names,
            sample_ids,
            original,
            scaled,
        })
    }

    /// Standard scaling: always centered, unit variance when `scale_variance`
    pub fn standardized(tables: &[FeatureTable], scale_variance: bool) -> Result<Self, DatasetError> {
        Self::new(tables, &StandardScaler::new(scale_variance))
    }

    /// Build from reconciled tables, keeping only the columns carrying `prefix`
    pub fn from_reconciled(
        tables: &[ReconciledTable],
        prefix: Option<&str>,
        scaler: &dyn Scaler,
    ) -> Result<Self, DatasetError> {
        let feature_tables: Vec<FeatureTable> = tables
            .iter()
            .map(|table| table.to_feature_table(prefix))
            .collect();
        Self::new(&feature_tables, scaler)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn sample_ids(&self) -> &[SampleId] {
        &self.sample_ids
    }

    /// Unscaled values (non-finite entries zeroed)
    pub fn original(&self) -> &Array2<f64> {
        &self.original
    }

    pub fn scaled(&self) -> &Array2<f64> {
        &self.scaled
    }

    /// `(samples, features)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.original.dim()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_ids.len()
    }
}
