//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod strategies;

use radiomics_batch::config::BatchConfig;
use radiomics_batch::models::{DomainError, FeatureMap, FeatureValue, Sample, SampleId, WorkItem};
use radiomics_batch::orchestration::FeatureExtractor;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Configuration writing logs (and optionally results) under `dir`
pub fn test_config(dir: &Path, cpus: usize) -> BatchConfig {
    let mut config = BatchConfig::default();
    config.extraction.available_cpus = Some(cpus);
    config.output.directory = dir.to_path_buf();
    config.logging.console_level = tracing::level_filters::LevelFilter::OFF;
    config
}

/// `group_sizes[g]` samples in group `g`, in group-major order
pub fn grouped_samples(group_sizes: &[usize]) -> Vec<Sample> {
    group_sizes
        .iter()
        .enumerate()
        .flat_map(|(group, &size)| {
            (0..size).map(move |state| {
                Sample::new(
                    SampleId::new(group, state),
                    format!("group{group}/state{state}.nrrd"),
                    format!("group{group}/state{state}_mask.nrrd"),
                )
            })
        })
        .collect()
}

pub fn samples(n: usize) -> Vec<Sample> {
    grouped_samples(&[n])
}

/// Deterministic stand-in for the feature engine
///
/// Produces diagnostics entries plus measured features derived from the sample id.
/// Samples whose id is in `failing` are rejected; `delay` scrambles completion order.
pub struct FakeEngine {
    pub failing: HashSet<SampleId>,
    pub panicking: HashSet<SampleId>,
    pub delay: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            panicking: HashSet::new(),
            delay: false,
        }
    }

    pub fn failing(ids: impl IntoIterator<Item = SampleId>) -> Self {
        Self {
            failing: ids.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self) -> Self {
        self.delay = true;
        self
    }

    pub fn into_extractor(self) -> Arc<dyn FeatureExtractor> {
        Arc::new(self)
    }
}

pub fn engine_features(id: SampleId) -> FeatureMap {
    let base = (id.group_index * 100 + id.state_index) as f64;
    FeatureMap::from_iter([
        ("diagnostics_Versions_PyRadiomics", FeatureValue::from("v3.1.0")),
        ("diagnostics_Image-original_Spacing", FeatureValue::from(vec![1.0, 1.0, 2.5])),
        ("original_shape_VoxelVolume", FeatureValue::from(base + 10.0)),
        ("original_firstorder_Mean", FeatureValue::from(base * 0.5)),
        ("original_glcm_Contrast", FeatureValue::from((base + 1.0).sqrt())),
    ])
}

impl FeatureExtractor for FakeEngine {
    fn extract(&self, item: &WorkItem) -> Result<FeatureMap, DomainError> {
        let id = item.id();
        if self.delay {
            thread::sleep(Duration::from_millis(((id.state_index * 7) % 5) as u64 * 3));
        }
        if self.panicking.contains(&id) {
            panic!("engine crashed on {id}");
        }
        if self.failing.contains(&id) {
            return Err(DomainError::new(format!("mask of {id} is empty")));
        }
        Ok(engine_features(id))
    }
}
