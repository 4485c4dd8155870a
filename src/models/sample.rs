//! # Samples and Work Items
//!
//! A [`Sample`] is one image/mask pair identified by its position in a grouped
//! batch. The orchestrator wraps samples into [`WorkItem`]s before dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Position of a sample inside a grouped batch
///
/// `group_index` partitions the batch (one subject, one series); `state_index` orders
/// samples inside a group. Ordering is lexicographic: group first, then state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId {
    pub group_index: usize,
    pub state_index: usize,
}

impl SampleId {
    pub fn new(group_index: usize, state_index: usize) -> Self {
        Self {
            group_index,
            state_index,
        }
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.group_index, self.state_index)
    }
}

/// Opaque handle to one image/mask pair
///
/// The core never opens the files; the paths are handed to the feature engine as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    pub image: PathBuf,
    pub mask: PathBuf,
}

impl Sample {
    pub fn new(id: SampleId, image: impl Into<PathBuf>, mask: impl Into<PathBuf>) -> Self {
        Self {
            id,
            image: image.into(),
            mask: mask.into(),
        }
    }
}

/// A sample tagged with its 1-based case ordinal
///
/// The ordinal is only used for naming (`Case-3_...`) and logging; it is independent
/// of the [`SampleId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub ordinal: usize,
    pub sample: Sample,
}

impl WorkItem {
    pub fn id(&self) -> SampleId {
        self.sample.id
    }
}
