//! # Feature Maps
//!
//! Ordered name → value mapping produced by the feature engine for one sample.
//! Key order is significant: it becomes the column order of every output table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value produced by the feature engine
///
/// Measured features are numbers; diagnostics entries may be strings or numeric
/// arrays (image spacing, bounding boxes, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Array(Vec<f64>),
    Text(String),
    Null,
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FeatureValue::Null)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl From<Vec<f64>> for FeatureValue {
    fn from(value: Vec<f64>) -> Self {
        FeatureValue::Array(value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `{:?}` keeps the fractional part of whole numbers (`0.0`, not `0`)
            FeatureValue::Number(value) => write!(f, "{value:?}"),
            FeatureValue::Array(values) => write!(f, "{values:?}"),
            FeatureValue::Text(text) => f.write_str(text),
            FeatureValue::Null => Ok(()),
        }
    }
}

/// Insertion-ordered mapping from feature name to value
///
/// Equality is order-sensitive: two maps with the same entries in a different
/// order produce different tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMap {
    entries: IndexMap<String, FeatureValue>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or replace a value; a replaced key keeps its original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// True when both maps have the same keys in the same order
    pub fn same_keys(&self, other: &FeatureMap) -> bool {
        self.keys().eq(other.keys())
    }
}

impl PartialEq for FeatureMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>, V: Into<FeatureValue>> FromIterator<(K, V)> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for FeatureMap {
    type Item = (String, FeatureValue);
    type IntoIter = indexmap::map::IntoIter<String, FeatureValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
