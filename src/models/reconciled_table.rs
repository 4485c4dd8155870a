//! Rectangular result table produced by reconciliation.

use serde::Serialize;
use thiserror::Error;

use super::feature_map::{FeatureMap, FeatureValue};
use crate::analysis::FeatureTable;

/// A row whose keys differ from the table headers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Row {row} does not match the table headers ({expected} columns expected, row has {actual})")]
pub struct HeaderMismatch {
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

/// Ordered headers plus one feature map per sample, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciledTable {
    headers: Vec<String>,
    rows: Vec<FeatureMap>,
}

impl ReconciledTable {
    pub fn new(headers: Vec<String>, rows: Vec<FeatureMap>) -> Self {
        Self { headers, rows }
    }

    /// Use the first row's keys as the headers
    pub fn from_rows(rows: Vec<FeatureMap>) -> Self {
        let headers = rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[FeatureMap] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row must carry exactly the headers, in header order
    pub fn validate(&self) -> Result<(), HeaderMismatch> {
        for (index, row) in self.rows.iter().enumerate() {
            let matches = row.len() == self.headers.len()
                && row.keys().zip(&self.headers).all(|(key, header)| key == header);
            if !matches {
                return Err(HeaderMismatch {
                    row: index,
                    expected: self.headers.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Numeric view of the table for analysis
    ///
    /// With a prefix only the matching columns are kept. Numbers pass through;
    /// any other value (text, arrays, missing cells) becomes NaN.
    pub fn to_feature_table(&self, prefix: Option<&str>) -> FeatureTable {
        let names: Vec<String> = self
            .headers
            .iter()
            .filter(|name| prefix.map_or(true, |p| name.starts_with(p)))
            .cloned()
            .collect();

        let values = self
            .rows
            .iter()
            .map(|row| {
                names
                    .iter()
                    .map(|name| {
                        row.get(name)
                            .and_then(FeatureValue::as_f64)
                            .unwrap_or(f64::NAN)
                    })
                    .collect()
            })
            .collect();

        FeatureTable::new(names, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, FeatureValue)]) -> FeatureMap {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_from_rows_uses_first_row_order() {
        let table = ReconciledTable::from_rows(vec![row(&[
            ("diagnostics_Version", "3.0".into()),
            ("original_Volume", 12.0.into()),
        ])]);
        assert_eq!(table.headers(), ["diagnostics_Version", "original_Volume"]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_differing_keys() {
        let table = ReconciledTable::from_rows(vec![
            row(&[("a", 1.0.into()), ("b", 2.0.into())]),
            row(&[("a", 1.0.into()), ("c", 2.0.into())]),
        ]);
        let err = table.validate().unwrap_err();
        assert_eq!(err.row, 1);
    }

    #[test]
    fn test_to_feature_table_selects_measured_columns() {
        let table = ReconciledTable::from_rows(vec![
            row(&[
                ("diagnostics_Hash", "abc".into()),
                ("original_Volume", 12.0.into()),
                ("original_Shape", "bad".into()),
            ]),
            row(&[
                ("diagnostics_Hash", "def".into()),
                ("original_Volume", 3.5.into()),
                ("original_Shape", 1.0.into()),
            ]),
        ]);

        let features = table.to_feature_table(Some("original"));
        assert_eq!(features.names(), ["original_Volume", "original_Shape"]);
        assert_eq!(features.values()[0][0], 12.0);
        assert!(features.values()[0][1].is_nan());
        assert_eq!(features.values()[1], vec![3.5, 1.0]);

        assert_eq!(table.to_feature_table(None).names().len(), 3);
    }
}
