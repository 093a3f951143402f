//! Error types for the data module.

use polars::prelude::PolarsError;

/// Result type for data module operations
pub type DataModuleResult<T> = Result<T, DataModuleError>;

/// Error type for data module operations
#[derive(Debug, thiserror::Error)]
pub enum DataModuleError {
    #[error("data must be a tabular DataFrame, got {0}")]
    UnsupportedData(String),

    #[error("{name} must lie in the open interval (0, 1), got {value}")]
    InvalidSplitRatio { name: &'static str, value: f64 },

    #[error("batch size must be positive")]
    InvalidBatchSize,

    #[error("target column '{0}' must not be listed among the feature columns")]
    OverlappingColumns(String),

    #[error("column '{0}' not found in data")]
    UnknownColumn(String),

    #[error("target column '{column}' has {count} missing values")]
    MissingTargets { column: String, count: usize },

    #[error("cannot stratify: {0}")]
    Stratification(String),

    #[error("sampling error: {0}")]
    Sampling(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("prepare_data() must be called before {0}()")]
    NotPrepared(&'static str),

    #[error("setup() must be called before {0}()")]
    NotSetUp(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] anyhow::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl DataModuleError {
    /// Whether the error reports a wrongly typed input rather than a bad value.
    pub fn is_type_error(&self) -> bool {
        matches!(self, DataModuleError::UnsupportedData(_))
    }
}
