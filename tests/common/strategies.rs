use proptest::prelude::*;
use radiomics_batch::models::{
    DomainError, ExtractionResult, FeatureMap, FeatureValue, ItemFailure,
};

/// Group sizes for a grouped batch: 1..=4 groups of 1..=6 samples
pub fn group_sizes_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=6, 1..=4)
}

/// Result set where each item is either complete, a prefix of the full key set, or failed
///
/// At least one item is complete so a template always exists.
pub fn ragged_results_strategy() -> impl Strategy<Value = Vec<ExtractionResult>> {
    prop::collection::vec((0usize..=6, any::<bool>()), 1..12).prop_map(|shapes| {
        let mut results: Vec<ExtractionResult> = shapes
            .into_iter()
            .enumerate()
            .map(|(index, (keep, failed))| {
                if failed {
                    ExtractionResult::Failed(ItemFailure::Domain(DomainError::new("failed")))
                } else {
                    ExtractionResult::Succeeded(full_map(index as f64).into_iter().take(keep).collect())
                }
            })
            .collect();
        results.push(ExtractionResult::Succeeded(full_map(99.0)));
        results
    })
}

pub fn full_map(seed: f64) -> FeatureMap {
    FeatureMap::from_iter([
        ("diagnostics_Version", FeatureValue::from("3.0")),
        ("original_a", FeatureValue::from(seed)),
        ("diagnostics_Mask", FeatureValue::from("mask.nrrd")),
        ("original_b", FeatureValue::from(seed * 2.0)),
        ("original_c", FeatureValue::from(seed + 0.5)),
        ("diagnostics_Spacing", FeatureValue::from(vec![1.0, 2.0])),
    ])
}
