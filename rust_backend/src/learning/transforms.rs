//! Batch transforms applied by the loaders.

use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fmt;
use std::sync::Arc;

use super::error::{DataModuleError, DataModuleResult};
use super::loader::{Batch, TensorBatch};

/// A step applied to every batch a loader yields.
pub trait Transform: Send + Sync + fmt::Debug {
    fn apply(&self, batch: Batch) -> DataModuleResult<Batch>;
}

/// Converts tabular batches into dense `f64` tensors.
///
/// Feature columns become the columns of a `rows × features` matrix; missing
/// feature values become `NaN`. Targets must be numeric and complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl Transform for ToTensor {
    fn apply(&self, batch: Batch) -> DataModuleResult<Batch> {
        match batch {
            Batch::Table { features, targets } => Ok(Batch::Tensor(TensorBatch {
                features: features_to_array(&features)?,
                targets: targets_to_array(&targets)?,
            })),
            Batch::Tensor(tensor) => Ok(Batch::Tensor(tensor)),
            Batch::Rows(_) => Err(DataModuleError::Transform(
                "ToTensor needs (features, target) batches; enable is_tabular".to_string(),
            )),
        }
    }
}

/// Applies transforms in sequence.
#[derive(Debug, Clone, Default)]
pub struct Compose {
    steps: Vec<Arc<dyn Transform>>,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<T: Transform + 'static>(mut self, step: T) -> Self {
        self.steps.push(Arc::new(step));
        self
    }
}

impl Transform for Compose {
    fn apply(&self, batch: Batch) -> DataModuleResult<Batch> {
        self.steps.iter().try_fold(batch, |batch, step| step.apply(batch))
    }
}

fn features_to_array(features: &DataFrame) -> DataModuleResult<Array2<f64>> {
    let mut array = Array2::<f64>::zeros((features.height(), features.width()));
    for (j, column) in features.get_columns().iter().enumerate() {
        let values = column
            .as_materialized_series()
            .strict_cast(&DataType::Float64)
            .map_err(|e| {
                DataModuleError::Transform(format!(
                    "feature column '{}' is not numeric: {}",
                    column.name(),
                    e
                ))
            })?;
        for (i, value) in values.f64()?.into_iter().enumerate() {
            array[[i, j]] = value.unwrap_or(f64::NAN);
        }
    }
    Ok(array)
}

fn targets_to_array(targets: &Series) -> DataModuleResult<Array1<f64>> {
    let values = targets.strict_cast(&DataType::Float64).map_err(|e| {
        DataModuleError::Transform(format!(
            "target column '{}' is not numeric: {}",
            targets.name(),
            e
        ))
    })?;
    values
        .f64()?
        .into_iter()
        .map(|value| {
            value.ok_or_else(|| {
                DataModuleError::Transform(format!(
                    "target column '{}' has missing values",
                    targets.name()
                ))
            })
        })
        .collect::<DataModuleResult<Vec<f64>>>()
        .map(Array1::from)
}
