//! # Principal Component Analysis
//!
//! PCA through a symmetric eigendecomposition of the sample covariance matrix.
//! Feature counts of extraction results are small (hundreds), so the dense
//! `features × features` covariance is cheap to form and decompose.
//!
//! Components are ordered by decreasing eigenvalue and sign-normalized (largest-magnitude
//! loading positive) so repeated runs on the same data give identical coordinates.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use super::feature_dataset::FeatureDataset;
use super::feature_table::FeatureTable;
use super::projection::{ProjectionError, Projector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcaProjector {
    /// Sweep limit of the eigen-solver; 0 iterates until convergence
    max_iterations: usize,
    tolerance: f64,
}

impl Default for PcaProjector {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            tolerance: f64::EPSILON,
        }
    }
}

impl PcaProjector {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Eigenpairs of the symmetric `covariance`, largest eigenvalue first
    fn eigenpairs(&self, covariance: &Array2<f64>) -> Result<Vec<(f64, Array1<f64>)>, ProjectionError> {
        let size = covariance.nrows();
        let matrix = DMatrix::from_fn(size, size, |row, column| covariance[[row, column]]);

        let eigen = SymmetricEigen::try_new(matrix, self.tolerance, self.max_iterations)
            .ok_or_else(|| {
                ProjectionError::Projector("covariance eigendecomposition did not converge".to_string())
            })?;

        let mut pairs: Vec<(f64, Array1<f64>)> = eigen
            .eigenvalues
            .iter()
            .zip(eigen.eigenvectors.column_iter())
            .map(|(&value, vector)| (value, vector.iter().copied().collect()))
            .collect();
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(pairs)
    }
}

impl Projector for PcaProjector {
    fn project(&self, data: &Array2<f64>, dimensions: usize) -> Result<Array2<f64>, ProjectionError> {
        let (samples, features) = data.dim();
        let max = samples.min(features);
        if dimensions == 0 || dimensions > max {
            return Err(ProjectionError::InvalidDimensions {
                requested: dimensions,
                max,
            });
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| ProjectionError::Projector("empty input matrix".to_string()))?;
        let centered = data - &mean;

        let denominator = samples.saturating_sub(1).max(1) as f64;
        let covariance = centered.t().dot(&centered) / denominator;

        let mut components = Array2::<f64>::zeros((features, dimensions));
        for (component, (eigenvalue, vector)) in
            self.eigenpairs(&covariance)?.into_iter().take(dimensions).enumerate()
        {
            debug!(component, eigenvalue, "Extracted principal component");
            components.column_mut(component).assign(&normalize_sign(vector));
        }

        Ok(centered.dot(&components))
    }
}

/// Flip the vector so its largest-magnitude entry is positive
fn normalize_sign(vector: Array1<f64>) -> Array1<f64> {
    let pivot = vector
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        -vector
    } else {
        vector
    }
}

/// Standardize a single table and project it onto its first `dimensions` components
pub fn calculate(table: &FeatureTable, dimensions: usize) -> crate::error::Result<Vec<Vec<f64>>> {
    let dataset = FeatureDataset::standardized(std::slice::from_ref(table), true)?;
    let projected = PcaProjector::default().project(dataset.scaled(), dimensions)?;
    Ok(projected.rows().into_iter().map(|row| row.to_vec()).collect())
}
