//! Turns an ordered batch of samples into ordinal-tagged work items.

use crate::models::{Sample, WorkItem};

/// Tag each sample with its 1-based case ordinal, preserving input order
///
/// An empty batch yields no work items.
pub fn enumerate_cases(samples: Vec<Sample>) -> Vec<WorkItem> {
    samples
        .into_iter()
        .enumerate()
        .map(|(index, sample)| WorkItem {
            ordinal: index + 1,
            sample,
        })
        .collect()
}
