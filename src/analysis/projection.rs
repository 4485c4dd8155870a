//! # Grouped Projection
//!
//! Projects every row of a dataset with an external [`Projector`] and splits the
//! projected rows back into per-group sequences. Rows arrive group-major, so a new
//! group starts whenever the group index changes between consecutive rows.

use ndarray::Array2;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::feature_dataset::FeatureDataset;
use crate::models::SampleId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Projection produced {actual} rows for {expected} samples")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Projection produced {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot project onto {requested} dimensions; at most {max} are available")]
    InvalidDimensions { requested: usize, max: usize },

    #[error("Projector failed: {0}")]
    Projector(String),
}

/// Dimensionality reduction routine: `(samples × features)` to `(samples × dimensions)`
///
/// [`GroupedProjector`] treats the routine as a black box. It expects a projector that
/// embeds all groups jointly in one call, such as t-SNE with a perplexity of
/// `min(30, samples - 1)`. The crate ships [`PcaProjector`](super::pca::PcaProjector),
/// which the CLI uses; a t-SNE implementation plugs in through this trait.
pub trait Projector {
    fn project(&self, data: &Array2<f64>, dimensions: usize) -> Result<Array2<f64>, ProjectionError>;
}

/// Projected coordinates split by group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionResult {
    /// Group index of each entry in `groups`
    pub group_indices: Vec<usize>,
    /// One sequence of projected rows per group, in state order
    pub groups: Vec<Vec<Vec<f64>>>,
}

impl ProjectionResult {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn total_points(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedProjector {
    dimensions: usize,
}

impl GroupedProjector {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn project(
        &self,
        dataset: &FeatureDataset,
        projector: &dyn Projector,
    ) -> Result<ProjectionResult, ProjectionError> {
        let rows = dataset.sample_count();

        // Constant-zero input is degenerate for most projectors
        let projected = if dataset.scaled().iter().all(|&value| value == 0.0) {
            debug!(rows, "All features are zero, skipping projector");
            Array2::zeros((rows, self.dimensions))
        } else {
            projector.project(dataset.scaled(), self.dimensions)?
        };

        if projected.nrows() != rows {
            return Err(ProjectionError::RowCountMismatch {
                expected: rows,
                actual: projected.nrows(),
            });
        }
        if projected.ncols() != self.dimensions {
            return Err(ProjectionError::DimensionMismatch {
                expected: self.dimensions,
                actual: projected.ncols(),
            });
        }

        let result = regroup(dataset.sample_ids(), &projected);
        if result.total_points() != rows {
            return Err(ProjectionError::RowCountMismatch {
                expected: rows,
                actual: result.total_points(),
            });
        }

        debug!(
            groups = result.group_count(),
            points = rows,
            "Projected dataset"
        );
        Ok(result)
    }
}

/// Split projected rows at every change of group index
pub fn regroup(sample_ids: &[SampleId], projected: &Array2<f64>) -> ProjectionResult {
    let mut result = ProjectionResult::default();
    let mut current_group = None;

    for (id, row) in sample_ids.iter().zip(projected.rows()) {
        if current_group != Some(id.group_index) {
            result.group_indices.push(id.group_index);
            result.groups.push(Vec::new());
            current_group = Some(id.group_index);
        }
        if let Some(group) = result.groups.last_mut() {
            group.push(row.to_vec());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FeatureTable;
    use std::cell::Cell;

    /// Returns the first `dimensions` scaled columns and counts its calls
    struct TruncatingProjector {
        calls: Cell<usize>,
    }

    impl Projector for TruncatingProjector {
        fn project(
            &self,
            data: &Array2<f64>,
            dimensions: usize,
        ) -> Result<Array2<f64>, ProjectionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(data.slice(ndarray::s![.., ..dimensions]).to_owned())
        }
    }

    struct DroppingProjector;

    impl Projector for DroppingProjector {
        fn project(
            &self,
            data: &Array2<f64>,
            dimensions: usize,
        ) -> Result<Array2<f64>, ProjectionError> {
            Ok(Array2::zeros((data.nrows() - 1, dimensions)))
        }
    }

    fn dataset(group_sizes: &[usize]) -> FeatureDataset {
        let tables: Vec<FeatureTable> = group_sizes
            .iter()
            .enumerate()
            .map(|(g, &size)| {
                FeatureTable::new(
                    vec!["a".into(), "b".into()],
                    (0..size).map(|s| vec![(g * 10 + s) as f64, s as f64]).collect(),
                )
            })
            .collect();
        FeatureDataset::standardized(&tables, true).unwrap()
    }

    #[test]
    fn test_groups_split_on_group_change() {
        let projector = TruncatingProjector { calls: Cell::new(0) };
        let result = GroupedProjector::new(2)
            .project(&dataset(&[2, 3]), &projector)
            .unwrap();

        assert_eq!(result.group_indices, vec![0, 1]);
        assert_eq!(result.groups[0].len(), 2);
        assert_eq!(result.groups[1].len(), 3);
        assert_eq!(projector.calls.get(), 1);
    }

    #[test]
    fn test_single_group() {
        let projector = TruncatingProjector { calls: Cell::new(0) };
        let result = GroupedProjector::new(1)
            .project(&dataset(&[4]), &projector)
            .unwrap();
        assert_eq!(result.group_count(), 1);
        assert_eq!(result.groups[0].len(), 4);
        assert!(result.groups[0].iter().all(|row| row.len() == 1));
    }

    #[test]
    fn test_all_zero_dataset_skips_projector() {
        let tables = vec![
            FeatureTable::new(vec!["a".into()], vec![vec![0.0], vec![0.0]]),
            FeatureTable::new(vec!["a".into()], vec![vec![0.0]]),
        ];
        let dataset = FeatureDataset::standardized(&tables, true).unwrap();
        let projector = TruncatingProjector { calls: Cell::new(0) };

        let result = GroupedProjector::new(3).project(&dataset, &projector).unwrap();
        assert_eq!(projector.calls.get(), 0);
        assert_eq!(result.groups, vec![
            vec![vec![0.0; 3], vec![0.0; 3]],
            vec![vec![0.0; 3]],
        ]);
    }

    #[test]
    fn test_row_count_mismatch_is_fatal() {
        let err = GroupedProjector::new(2)
            .project(&dataset(&[3]), &DroppingProjector)
            .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::RowCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }
}
