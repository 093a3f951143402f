//! Discrete class labels of a classification target.

use polars::prelude::*;
use std::collections::BTreeMap;

use super::error::{DataModuleError, DataModuleResult};

/// Target values encoded as dense class codes.
///
/// Classes are identified by the textual form of the target value and
/// numbered in sorted order, so `0.0`/`1.0` targets become codes `0`/`1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabels {
    codes: Vec<usize>,
    classes: Vec<String>,
}

impl ClassLabels {
    /// Encode a target column. Missing values are rejected.
    pub fn from_series(series: &Series) -> DataModuleResult<Self> {
        let missing = series.null_count();
        if missing > 0 {
            return Err(DataModuleError::MissingTargets {
                column: series.name().to_string(),
                count: missing,
            });
        }

        let as_text = series.cast(&DataType::String)?;
        let values = as_text.str()?;

        let mut lookup: BTreeMap<String, usize> = BTreeMap::new();
        for value in values.into_iter().flatten() {
            lookup.entry(value.to_string()).or_insert(0);
        }
        let classes: Vec<String> = lookup.keys().cloned().collect();
        for (code, slot) in lookup.values_mut().enumerate() {
            *slot = code;
        }

        let codes = values
            .into_iter()
            .map(|value| lookup[value.unwrap_or_default()])
            .collect();

        Ok(Self { codes, classes })
    }

    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes of the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Vec<usize> {
        rows.iter().map(|&row| self.codes[row]).collect()
    }

    /// Number of rows per class.
    pub fn counts(&self) -> Vec<usize> {
        class_counts(&self.codes, self.num_classes())
    }
}

/// Number of occurrences of each code in `0..num_classes`.
pub fn class_counts(codes: &[usize], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; num_classes];
    for &code in codes {
        counts[code] += 1;
    }
    counts
}

/// Relative frequency of each code in `0..num_classes`.
pub fn class_distribution(codes: &[usize], num_classes: usize) -> Vec<f64> {
    let total = codes.len().max(1) as f64;
    class_counts(codes, num_classes)
        .into_iter()
        .map(|count| count as f64 / total)
        .collect()
}
