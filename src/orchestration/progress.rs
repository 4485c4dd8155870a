//! Progress reporting for a dispatch.
//!
//! Updates carry the cumulative number of completed items (never an ordinal), are
//! monotonically non-decreasing, and are only ever emitted by the coordinating thread.

/// Snapshot passed to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Items finished so far, in completion order
    pub completed: usize,
    pub total: usize,
}

impl ProgressUpdate {
    /// Completion ratio in `[0, 1]`; an empty batch counts as finished
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Owned by the coordinator; wraps the caller's callback
pub struct ProgressReporter<'a> {
    callback: Box<dyn FnMut(ProgressUpdate) + Send + 'a>,
    completed: usize,
    total: usize,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(total: usize, callback: impl FnMut(ProgressUpdate) + Send + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            completed: 0,
            total,
        }
    }

    pub fn silent(total: usize) -> Self {
        Self::new(total, |_| {})
    }

    /// Record one more completed item and notify the callback
    pub fn advance(&mut self) {
        self.completed = (self.completed + 1).min(self.total);
        (self.callback)(ProgressUpdate {
            completed: self.completed,
            total: self.total,
        });
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
