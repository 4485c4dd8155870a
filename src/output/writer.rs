//! CSV / text / JSON result writer.
//!
//! The table is validated before any file is created, so an inconsistent table never
//! truncates previous results. Every file is truncated on open: re-running a batch
//! overwrites its outputs instead of appending stale rows.

use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::OutputError;
use crate::config::OutputConfig;
use crate::constants::files;
use crate::models::ReconciledTable;

/// Paths of the files written by one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub csv: Option<PathBuf>,
    pub txt: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl WrittenOutputs {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [&self.csv, &self.txt, &self.json]
            .into_iter()
            .filter_map(|path| path.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
    write_csv: bool,
    write_txt: bool,
    write_json: bool,
    timestamped: bool,
}

impl OutputWriter {
    /// All three formats, fixed `results.*` names
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            write_csv: true,
            write_txt: true,
            write_json: true,
            timestamped: false,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            write_csv: config.write_csv,
            write_txt: config.write_txt,
            write_json: config.write_json,
            timestamped: config.timestamped,
        }
    }

    pub fn with_formats(mut self, csv: bool, txt: bool, json: bool) -> Self {
        self.write_csv = csv;
        self.write_txt = txt;
        self.write_json = json;
        self
    }

    pub fn timestamped(mut self, timestamped: bool) -> Self {
        self.timestamped = timestamped;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn write(&self, table: &ReconciledTable) -> Result<WrittenOutputs, OutputError> {
        table.validate()?;

        fs::create_dir_all(&self.directory)
            .map_err(|e| OutputError::io(&self.directory, e))?;

        let stem = self.file_stem();
        let mut outputs = WrittenOutputs::default();

        if self.write_csv {
            let path = self.path_for(&stem, files::CSV_EXTENSION);
            write_csv(&path, table)?;
            outputs.csv = Some(path);
        }
        if self.write_txt {
            let path = self.path_for(&stem, files::TXT_EXTENSION);
            write_txt(&path, table)?;
            outputs.txt = Some(path);
        }
        if self.write_json {
            let path = self.path_for(&stem, files::JSON_EXTENSION);
            write_json(&path, table)?;
            outputs.json = Some(path);
        }

        info!(
            rows = table.len(),
            columns = table.headers().len(),
            directory = %self.directory.display(),
            "Wrote result files"
        );
        Ok(outputs)
    }

    fn file_stem(&self) -> String {
        if self.timestamped {
            format!(
                "{}-{}",
                files::RESULTS_STEM,
                Local::now().format(files::RESULTS_TIMESTAMP_FORMAT)
            )
        } else {
            files::RESULTS_STEM.to_string()
        }
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.directory.join(format!("{stem}.{extension}"))
    }
}

fn write_csv(path: &Path, table: &ReconciledTable) -> Result<(), OutputError> {
    debug!(path = %path.display(), "Writing CSV results");

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| OutputError::csv(path, e))?;

    writer
        .write_record(table.headers())
        .map_err(|e| OutputError::csv(path, e))?;

    for row in table.rows() {
        let record = table.headers().iter().map(|header| {
            row.get(header)
                .map(|value| value.to_string())
                .unwrap_or_default()
        });
        writer
            .write_record(record)
            .map_err(|e| OutputError::csv(path, e))?;
    }

    writer.flush().map_err(|e| OutputError::io(path, e))
}

/// One `Case-<n>_<name>: <value>` line per feature, cases numbered from 1
fn write_txt(path: &Path, table: &ReconciledTable) -> Result<(), OutputError> {
    debug!(path = %path.display(), "Writing text results");

    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut out = BufWriter::new(file);

    for (index, row) in table.rows().iter().enumerate() {
        for (name, value) in row.iter() {
            writeln!(out, "Case-{}_{}: {}", index + 1, name, value)
                .map_err(|e| OutputError::io(path, e))?;
        }
    }

    out.flush().map_err(|e| OutputError::io(path, e))
}

fn write_json(path: &Path, table: &ReconciledTable) -> Result<(), OutputError> {
    debug!(path = %path.display(), "Writing JSON results");

    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut out = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut out, table.rows()).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    out.flush().map_err(|e| OutputError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureMap, FeatureValue};
    use tempfile::TempDir;

    fn sample_table() -> ReconciledTable {
        ReconciledTable::from_rows(vec![
            FeatureMap::from_iter([
                ("diagnostics_Version", FeatureValue::from("3.0")),
                ("original_Volume", FeatureValue::from(12.5)),
            ]),
            FeatureMap::from_iter([
                ("diagnostics_Version", FeatureValue::from("3.0")),
                ("original_Volume", FeatureValue::from(0.0)),
            ]),
        ])
    }

    #[test]
    fn test_writes_all_three_formats() {
        let dir = TempDir::new().unwrap();
        let outputs = OutputWriter::new(dir.path()).write(&sample_table()).unwrap();
        assert_eq!(outputs.paths().count(), 3);

        let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
        assert_eq!(
            csv,
            "diagnostics_Version,original_Volume\n3.0,12.5\n3.0,0.0\n"
        );

        let txt = fs::read_to_string(dir.path().join("results.txt")).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Case-1_diagnostics_Version: 3.0",
                "Case-1_original_Volume: 12.5",
                "Case-2_diagnostics_Version: 3.0",
                "Case-2_original_Volume: 0.0",
            ]
        );

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("results.json")).unwrap())
                .unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["original_Volume"], 12.5);
    }

    #[test]
    fn test_format_selection() {
        let dir = TempDir::new().unwrap();
        let outputs = OutputWriter::new(dir.path())
            .with_formats(true, false, false)
            .write(&sample_table())
            .unwrap();
        assert!(outputs.csv.is_some());
        assert!(outputs.txt.is_none());
        assert!(!dir.path().join("results.json").exists());
    }

    #[test]
    fn test_timestamped_names() {
        let dir = TempDir::new().unwrap();
        let outputs = OutputWriter::new(dir.path())
            .timestamped(true)
            .with_formats(true, false, false)
            .write(&sample_table())
            .unwrap();
        let name = outputs
            .csv
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        // results-YYYY-mm-dd-HH-MM-SS.csv
        assert!(name.starts_with("results-"));
        assert_eq!(name.len(), "results-".len() + 19 + ".csv".len());
    }
}
