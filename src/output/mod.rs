//! # Result Files
//!
//! Writes a reconciled table as three synchronized representations (CSV, free text,
//! JSON) and reads a written CSV back for re-projection.

pub mod reader;
pub mod writer;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::HeaderMismatch;

pub use reader::read_csv_table;
pub use writer::{OutputWriter, WrittenOutputs};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Refusing to write inconsistent table: {0}")]
    HeaderMismatch(#[from] HeaderMismatch),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error on '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error on '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
