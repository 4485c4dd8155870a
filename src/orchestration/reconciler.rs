//! # Result Reconciliation
//!
//! Turns the per-item results of a batch into one rectangular table.
//!
//! The template is the first result with the most keys. Every row is rebuilt in
//! template key order; keys a row lacks are backfilled:
//! - measured features (names carrying the measured prefix) get `0.0`
//! - everything else (diagnostics, settings, versions) copies the template's value
//!
//! Keys that only non-template rows carry are dropped unless extra columns are kept,
//! in which case they are appended as sorted headers and filled with `null` where absent.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::constants::{BACKFILL_VALUE, MEASURED_FEATURE_PREFIX};
use crate::models::{ExtractionResult, FeatureMap, FeatureValue, HeaderMismatch, ReconciledTable};

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("No item in a batch of {results} produced any features")]
    NoTemplate { results: usize },

    #[error("Reconciled table is inconsistent: {0}")]
    Inconsistent(#[from] HeaderMismatch),
}

/// How many rows needed backfilling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    /// Rows that already carried every template key
    pub complete: usize,
    /// Rows with at least one backfilled key (failed items included)
    pub backfilled: usize,
    /// Items whose feature engine call failed
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub table: ReconciledTable,
    pub stats: ReconciliationStats,
}

#[derive(Debug, Clone)]
pub struct ResultReconciler {
    measured_prefix: String,
    keep_extra_columns: bool,
}

impl Default for ResultReconciler {
    fn default() -> Self {
        Self::new(MEASURED_FEATURE_PREFIX, false)
    }
}

impl ResultReconciler {
    pub fn new(measured_prefix: impl Into<String>, keep_extra_columns: bool) -> Self {
        Self {
            measured_prefix: measured_prefix.into(),
            keep_extra_columns,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.measured_prefix.clone(), config.keep_extra_columns)
    }

    pub fn reconcile(&self, results: &[ExtractionResult]) -> Result<Reconciliation, ReconcileError> {
        if results.is_empty() {
            return Ok(Reconciliation {
                table: ReconciledTable::default(),
                stats: ReconciliationStats::default(),
            });
        }

        let template = Self::select_template(results).ok_or(ReconcileError::NoTemplate {
            results: results.len(),
        })?;
        debug!(
            template_keys = template.len(),
            "Selected reconciliation template"
        );

        let extra_headers = if self.keep_extra_columns {
            Self::extra_keys(results, template)
        } else {
            Vec::new()
        };

        let mut stats = ReconciliationStats::default();
        let mut rows = Vec::with_capacity(results.len());

        for result in results {
            let source = match result {
                ExtractionResult::Succeeded(map) => Some(map),
                ExtractionResult::Failed(_) => {
                    stats.failed += 1;
                    None
                }
            };

            let mut row = FeatureMap::with_capacity(template.len() + extra_headers.len());
            let mut backfilled = false;

            for (name, template_value) in template.iter() {
                match source.and_then(|map| map.get(name)) {
                    Some(value) => row.insert(name, value.clone()),
                    None => {
                        backfilled = true;
                        row.insert(name, self.backfill_value(name, template_value));
                    }
                }
            }

            for name in &extra_headers {
                let value = source
                    .and_then(|map| map.get(name))
                    .cloned()
                    .unwrap_or(FeatureValue::Null);
                row.insert(name.as_str(), value);
            }

            if backfilled {
                stats.backfilled += 1;
            } else {
                stats.complete += 1;
            }
            rows.push(row);
        }

        let headers = template
            .keys()
            .map(str::to_string)
            .chain(extra_headers)
            .collect();
        let table = ReconciledTable::new(headers, rows);
        table.validate()?;

        Ok(Reconciliation { table, stats })
    }

    fn backfill_value(&self, name: &str, template_value: &FeatureValue) -> FeatureValue {
        if name.starts_with(&self.measured_prefix) {
            FeatureValue::Number(BACKFILL_VALUE)
        } else {
            template_value.clone()
        }
    }

    /// First result with the maximum key count; `None` when every result is empty
    fn select_template(results: &[ExtractionResult]) -> Option<&FeatureMap> {
        let mut template: Option<&FeatureMap> = None;
        for result in results {
            if let ExtractionResult::Succeeded(map) = result {
                if map.len() > template.map_or(0, FeatureMap::len) {
                    template = Some(map);
                }
            }
        }
        template
    }

    fn extra_keys(results: &[ExtractionResult], template: &FeatureMap) -> Vec<String> {
        let extras: BTreeSet<&str> = results
            .iter()
            .filter_map(|result| match result {
                ExtractionResult::Succeeded(map) => Some(map),
                ExtractionResult::Failed(_) => None,
            })
            .flat_map(|map| map.keys())
            .filter(|key| !template.contains_key(key))
            .collect();
        extras.into_iter().map(str::to_string).collect()
    }
}
