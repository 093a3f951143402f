//! Batch iteration over a partition.

use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::sync::Arc;

use super::error::{DataModuleError, DataModuleResult};
use super::transforms::Transform;

/// Dense numeric batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBatch {
    /// `rows × features`
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
}

/// One batch yielded by a [`DataLoader`].
#[derive(Debug, Clone)]
pub enum Batch {
    /// Whole rows, every column (`is_tabular = false`).
    Rows(DataFrame),
    /// Feature columns and the target column (`is_tabular = true`).
    Table { features: DataFrame, targets: Series },
    /// Output of [`ToTensor`](super::transforms::ToTensor).
    Tensor(TensorBatch),
}

impl Batch {
    pub fn len(&self) -> usize {
        match self {
            Batch::Rows(rows) => rows.height(),
            Batch::Table { features, .. } => features.height(),
            Batch::Tensor(tensor) => tensor.targets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Columns a loader projects each batch onto.
#[derive(Debug, Clone)]
pub struct ColumnSelection {
    pub x_col: Vec<String>,
    pub y_col: String,
}

/// Iterator over the batches of one epoch.
///
/// Built fresh by every `*_dataloader()` call; the visiting order is fixed
/// when the loader is created.
#[derive(Debug, Clone)]
pub struct DataLoader {
    frame: DataFrame,
    order: Vec<usize>,
    batch_size: usize,
    columns: ColumnSelection,
    is_tabular: bool,
    transform: Option<Arc<dyn Transform>>,
    cursor: usize,
}

impl DataLoader {
    pub fn new(
        frame: DataFrame,
        order: Vec<usize>,
        batch_size: usize,
        columns: ColumnSelection,
        is_tabular: bool,
        transform: Option<Arc<dyn Transform>>,
    ) -> DataModuleResult<Self> {
        if batch_size == 0 {
            return Err(DataModuleError::InvalidBatchSize);
        }
        if let Some(&position) = order.iter().find(|&&p| p >= frame.height()) {
            return Err(DataModuleError::Sampling(format!(
                "position {} is outside a partition of {} rows",
                position,
                frame.height()
            )));
        }
        Ok(Self {
            frame,
            order,
            batch_size,
            columns,
            is_tabular,
            transform,
            cursor: 0,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Rows visited during the epoch.
    pub fn num_samples(&self) -> usize {
        self.order.len()
    }

    /// Batches in the epoch, including a final partial batch.
    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }

    /// Partition positions of the epoch, in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn build_batch(&self, positions: &[usize]) -> DataModuleResult<Batch> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            positions.iter().map(|&p| p as IdxSize).collect(),
        );
        let rows = self.frame.take(&idx)?;

        let batch = if self.is_tabular {
            let features = rows.select(self.columns.x_col.iter().cloned())?;
            let targets = rows
                .column(&self.columns.y_col)?
                .as_materialized_series()
                .clone();
            Batch::Table { features, targets }
        } else {
            Batch::Rows(rows)
        };

        match &self.transform {
            Some(transform) => transform.apply(batch),
            None => Ok(batch),
        }
    }
}

impl Iterator for DataLoader {
    type Item = DataModuleResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.build_batch(&self.order[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DataLoader {}
