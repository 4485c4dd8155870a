//! High-water mark deciding whether a batch starts a new extraction.

use crate::models::{Sample, SampleId};

/// Tracks the highest sample id seen across batches of one caller
///
/// A batch whose highest id is below the recorded mark (or the first batch ever)
/// starts a new extraction, which truncates the log file. Any other batch continues
/// the current extraction and appends to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionContext {
    highest_sample_id: Option<SampleId>,
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_sample_id(&self) -> Option<SampleId> {
        self.highest_sample_id
    }

    /// Record a batch and report whether it starts a new extraction
    ///
    /// The mark always moves to the batch's highest id. An empty batch leaves the
    /// mark untouched and only counts as new when nothing was registered before.
    pub fn register_batch(&mut self, samples: &[Sample]) -> bool {
        let Some(batch_highest) = samples.iter().map(|sample| sample.id).max() else {
            return self.highest_sample_id.is_none();
        };

        let is_new = self
            .highest_sample_id
            .map_or(true, |recorded| batch_highest < recorded);
        self.highest_sample_id = Some(batch_highest);
        is_new
    }
}
