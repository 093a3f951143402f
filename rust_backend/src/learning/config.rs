//! Data module configuration.
//!
//! [`DataModuleConfig`] carries everything a [`BaseDataModule`](super::BaseDataModule)
//! needs besides the data itself. It can be built in code or read from a
//! TOML or JSON file:
//!
//! ```toml
//! y_col = "label"
//! x_col = ["area", "flux"]
//! train_test_split = 0.2
//! train_val_split = 0.2
//! batch_size = 16
//! seed = 7
//!
//! [train_conf]
//! batch_size = 32
//!
//! [val_conf]
//!
//! [test_conf]
//! is_tabular = false
//! ```
//!
//! Transforms cannot be expressed in a file; attach them with
//! [`SplitConfig::with_transform`] after loading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::error::{DataModuleError, DataModuleResult};
use super::transforms::Transform;

/// One of the three partitions produced by `setup()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loader options for a single split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Overrides the module-wide batch size.
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Emit `(features, target)` pairs instead of whole rows.
    #[serde(default = "default_true")]
    pub is_tabular: bool,
    /// Shuffle the partition on every epoch. Only consulted for val/test;
    /// the train loader always draws randomly.
    #[serde(default)]
    pub shuffle: bool,
    #[serde(skip)]
    pub transform: Option<Arc<dyn Transform>>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            is_tabular: true,
            shuffle: false,
            transform: None,
        }
    }
}

impl SplitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_tabular(mut self, is_tabular: bool) -> Self {
        self.is_tabular = is_tabular;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }
}

/// Configuration of a [`BaseDataModule`](super::BaseDataModule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataModuleConfig {
    /// Target column.
    pub y_col: String,
    /// Feature columns. Inferred as every non-target column when absent.
    #[serde(default)]
    pub x_col: Option<Vec<String>>,
    /// Fraction of the whole dataset reserved for testing.
    #[serde(default = "default_split_ratio")]
    pub train_test_split: f64,
    /// Fraction of the remaining data reserved for validation.
    #[serde(default = "default_split_ratio")]
    pub train_val_split: f64,
    #[serde(default)]
    pub train_conf: Option<SplitConfig>,
    #[serde(default)]
    pub val_conf: Option<SplitConfig>,
    #[serde(default)]
    pub test_conf: Option<SplitConfig>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub is_regression: bool,
    /// Keep class proportions inside every training batch.
    #[serde(default = "default_true")]
    pub stratified_shuffle: bool,
    /// Draw training rows with probability inversely proportional to their
    /// class frequency. Takes precedence over `stratified_shuffle`.
    #[serde(default = "default_true")]
    pub weighted_sampling: bool,
    /// Seed for splits and loaders. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_split_ratio() -> f64 {
    0.2
}

fn default_batch_size() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl DataModuleConfig {
    pub fn new(y_col: impl Into<String>) -> Self {
        Self {
            y_col: y_col.into(),
            x_col: None,
            train_test_split: default_split_ratio(),
            train_val_split: default_split_ratio(),
            train_conf: None,
            val_conf: None,
            test_conf: None,
            batch_size: default_batch_size(),
            is_regression: false,
            stratified_shuffle: true,
            weighted_sampling: true,
            seed: None,
        }
    }

    pub fn with_x_col<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.x_col = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_train_test_split(mut self, ratio: f64) -> Self {
        self.train_test_split = ratio;
        self
    }

    pub fn with_train_val_split(mut self, ratio: f64) -> Self {
        self.train_val_split = ratio;
        self
    }

    pub fn with_split_config(mut self, split: Split, config: SplitConfig) -> Self {
        *self.split_config_mut(split) = Some(config);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_regression(mut self, is_regression: bool) -> Self {
        self.is_regression = is_regression;
        self
    }

    pub fn with_stratified_shuffle(mut self, enabled: bool) -> Self {
        self.stratified_shuffle = enabled;
        self
    }

    pub fn with_weighted_sampling(mut self, enabled: bool) -> Self {
        self.weighted_sampling = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn split_config(&self, split: Split) -> Option<&SplitConfig> {
        match split {
            Split::Train => self.train_conf.as_ref(),
            Split::Val => self.val_conf.as_ref(),
            Split::Test => self.test_conf.as_ref(),
        }
    }

    fn split_config_mut(&mut self, split: Split) -> &mut Option<SplitConfig> {
        match split {
            Split::Train => &mut self.train_conf,
            Split::Val => &mut self.val_conf,
            Split::Test => &mut self.test_conf,
        }
    }

    /// Load configuration from a `.toml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> DataModuleResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DataModuleError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&content),
            other => Err(DataModuleError::Config(format!(
                "Unsupported config format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> DataModuleResult<Self> {
        toml::from_str(content).map_err(|e| {
            DataModuleError::Config(format!("Failed to parse TOML config: {}", e))
        })
    }

    /// Parse JSON configuration, reporting the path of the offending field on failure.
    pub fn from_json_str(content: &str) -> DataModuleResult<Self> {
        let deserializer = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            DataModuleError::Config(format!(
                "Failed to parse JSON config at '{}': {}",
                e.path(),
                e.inner()
            ))
        })
    }
}
