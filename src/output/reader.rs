//! Reads a written `results*.csv` back into a [`ReconciledTable`].

use std::path::Path;
use tracing::debug;

use super::OutputError;
use crate::models::{FeatureMap, FeatureValue, ReconciledTable};

/// Load a result CSV: numbers become `Number`, empty cells `Null`, anything else `Text`
///
/// Bracketed numeric lists written for array-valued diagnostics (`[1.0, 2.5]`) are
/// read back as `Array`.
pub fn read_csv_table(path: impl AsRef<Path>) -> Result<ReconciledTable, OutputError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| OutputError::csv(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| OutputError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| OutputError::csv(path, e))?;
        let row: FeatureMap = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.as_str(), parse_cell(cell)))
            .collect();
        rows.push(row);
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = headers.len(),
        "Loaded result table"
    );

    let table = ReconciledTable::new(headers, rows);
    table.validate()?;
    Ok(table)
}

fn parse_cell(cell: &str) -> FeatureValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return FeatureValue::Null;
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return FeatureValue::Number(number);
    }
    if trimmed.starts_with('[') {
        if let Ok(values) = serde_json::from_str::<Vec<f64>>(trimmed) {
            return FeatureValue::Array(values);
        }
    }
    FeatureValue::Text(cell.to_string())
}
