//! Configuration-driven data module.
//!
//! [`BaseDataModule`] holds a table, a target column and per-split loader
//! options. It moves through three stages:
//!
//! 1. **Created**: configuration checked for contradictions.
//! 2. **Prepared**: `prepare_data()` resolved the data and validated it.
//! 3. **Set up**: `setup()` split the rows into train/val/test.
//!
//! Loaders are built on demand from the set-up partitions.
//!
//! # Example
//!
//! ```no_run
//! use pythia_rust::learning::{BaseDataModule, DataModuleConfig, DataSource, Split, SplitConfig, ToTensor};
//! use polars::prelude::*;
//!
//! # fn example(df: DataFrame) -> Result<(), Box<dyn std::error::Error>> {
//! let config = DataModuleConfig::new("label")
//!     .with_split_config(Split::Train, SplitConfig::new().with_transform(ToTensor))
//!     .with_split_config(Split::Val, SplitConfig::new())
//!     .with_split_config(Split::Test, SplitConfig::new());
//!
//! let mut module = BaseDataModule::new(DataSource::from(df), config)?;
//! module.prepare_data()?;
//! module.setup()?;
//! for batch in module.train_dataloader()? {
//!     let batch = batch?;
//!     println!("{} rows", batch.len());
//! }
//! # Ok(())
//! # }
//! ```

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::advisory::{Advisories, AdvisoryKind};
use super::config::{DataModuleConfig, Split, SplitConfig};
use super::error::{DataModuleError, DataModuleResult};
use super::labels::ClassLabels;
use super::loader::{ColumnSelection, DataLoader};
use super::sampler::{
    RandomSampler, Sampler, SequentialSampler, StratifiedBatchSampler, WeightedRandomSampler,
};
use super::splitter::{ShuffleSplitter, Splitter, StratifiedSplitter};
use crate::io::loaders::TableLoader;

/// Input handed to a data module.
///
/// Only tabular sources are accepted; the others exist so that a wrongly
/// typed input is reported by `prepare_data()` like any other invalid data.
#[derive(Debug, Clone)]
pub enum DataSource {
    Frame(DataFrame),
    Csv(PathBuf),
    Json(PathBuf),
    Series(Series),
    Scalar(AnyValue<'static>),
}

impl DataSource {
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        DataSource::Csv(path.into())
    }

    pub fn json(path: impl Into<PathBuf>) -> Self {
        DataSource::Json(path.into())
    }

    fn resolve(&self) -> DataModuleResult<DataFrame> {
        match self {
            DataSource::Frame(df) => Ok(df.clone()),
            DataSource::Csv(path) => Ok(TableLoader::load_csv(path)?),
            DataSource::Json(path) => Ok(TableLoader::load_json(path)?),
            DataSource::Series(series) => Err(DataModuleError::UnsupportedData(format!(
                "Series of {}",
                series.dtype()
            ))),
            DataSource::Scalar(value) => Err(DataModuleError::UnsupportedData(format!(
                "scalar of {}",
                value.dtype()
            ))),
        }
    }
}

impl From<DataFrame> for DataSource {
    fn from(df: DataFrame) -> Self {
        DataSource::Frame(df)
    }
}

impl From<Series> for DataSource {
    fn from(series: Series) -> Self {
        DataSource::Series(series)
    }
}

impl From<i32> for DataSource {
    fn from(value: i32) -> Self {
        DataSource::Scalar(AnyValue::Int32(value))
    }
}

impl From<i64> for DataSource {
    fn from(value: i64) -> Self {
        DataSource::Scalar(AnyValue::Int64(value))
    }
}

impl From<f64> for DataSource {
    fn from(value: f64) -> Self {
        DataSource::Scalar(AnyValue::Float64(value))
    }
}

/// Lifecycle stage of a [`BaseDataModule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Created,
    Prepared,
    SetUp,
}

/// Rows of one split.
#[derive(Debug, Clone)]
pub struct Partition {
    indices: Vec<usize>,
    frame: DataFrame,
    labels: Option<Vec<usize>>,
}

impl Partition {
    /// Row indices into the full dataset, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Class codes of the partition rows, for classification targets.
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Prepares, splits and serves a table to a training loop.
pub struct BaseDataModule {
    source: DataSource,
    config: DataModuleConfig,
    stage: Stage,
    data: Option<DataFrame>,
    x_col: Option<Vec<String>>,
    labels: Option<ClassLabels>,
    splitter: Option<Box<dyn Splitter>>,
    train: Option<Partition>,
    val: Option<Partition>,
    test: Option<Partition>,
    train_conf: SplitConfig,
    val_conf: SplitConfig,
    test_conf: SplitConfig,
    advisories: Advisories,
    draws: AtomicU64,
}

impl BaseDataModule {
    /// Create a data module.
    ///
    /// Fails when the feature columns include the target column. Sampling
    /// flags that need discrete classes are turned off for regression
    /// targets, with an advisory.
    pub fn new(data: impl Into<DataSource>, config: DataModuleConfig) -> DataModuleResult<Self> {
        let mut config = config;
        let mut advisories = Advisories::new();

        if let Some(x_col) = &config.x_col {
            if x_col.iter().any(|c| c == &config.y_col) {
                return Err(DataModuleError::OverlappingColumns(config.y_col.clone()));
            }
        }

        if config.is_regression {
            if config.stratified_shuffle {
                advisories.warn(
                    AdvisoryKind::StratifiedShuffleDisabled,
                    "stratified_shuffle needs discrete classes and is disabled for regression targets",
                );
                config.stratified_shuffle = false;
            }
            if config.weighted_sampling {
                advisories.warn(
                    AdvisoryKind::WeightedSamplingDisabled,
                    "weighted_sampling needs discrete classes and is disabled for regression targets",
                );
                config.weighted_sampling = false;
            }
        }

        Ok(Self {
            source: data.into(),
            x_col: config.x_col.clone(),
            config,
            stage: Stage::Created,
            data: None,
            labels: None,
            splitter: None,
            train: None,
            val: None,
            test: None,
            train_conf: SplitConfig::default(),
            val_conf: SplitConfig::default(),
            test_conf: SplitConfig::default(),
            advisories,
            draws: AtomicU64::new(0),
        })
    }

    /// Replace the default splitter (stratified for classification,
    /// shuffled for regression).
    pub fn with_splitter<S: Splitter + 'static>(mut self, splitter: S) -> Self {
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// Resolve and validate the data.
    ///
    /// Fails with a type error when the source is not tabular and with a
    /// value error when a split ratio lies outside (0, 1), the batch size
    /// is zero or a configured column is missing.
    ///
    /// Preparing again discards the data, labels and partitions of earlier
    /// calls; `setup()` has to run again before loaders are available.
    pub fn prepare_data(&mut self) -> DataModuleResult<()> {
        self.reset();
        let data = self.source.resolve()?;

        check_ratio("train_test_split", self.config.train_test_split)?;
        check_ratio("train_val_split", self.config.train_val_split)?;

        let batch_sizes = std::iter::once(Some(self.config.batch_size)).chain(
            Split::ALL
                .iter()
                .map(|split| self.config.split_config(*split).and_then(|c| c.batch_size)),
        );
        if batch_sizes.flatten().any(|size| size == 0) {
            return Err(DataModuleError::InvalidBatchSize);
        }

        let columns: Vec<String> = data
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        if !columns.contains(&self.config.y_col) {
            return Err(DataModuleError::UnknownColumn(self.config.y_col.clone()));
        }

        match &self.x_col {
            Some(x_col) => {
                if let Some(missing) = x_col.iter().find(|c| !columns.contains(*c)) {
                    return Err(DataModuleError::UnknownColumn(missing.clone()));
                }
            }
            None => {
                let inferred: Vec<String> = columns
                    .iter()
                    .filter(|c| **c != self.config.y_col)
                    .cloned()
                    .collect();
                self.advisories.warn(
                    AdvisoryKind::InferredFeatureColumns,
                    format!(
                        "x_col not given; using every column except '{}': {:?}",
                        self.config.y_col, inferred
                    ),
                );
                self.x_col = Some(inferred);
            }
        }

        self.labels = if self.config.is_regression {
            None
        } else {
            let target = data.column(&self.config.y_col)?.as_materialized_series();
            Some(ClassLabels::from_series(target)?)
        };

        log::info!(
            "Prepared {} rows with {} feature columns, target '{}'",
            data.height(),
            self.x_col.as_ref().map_or(0, Vec::len),
            self.config.y_col
        );

        self.data = Some(data);
        self.stage = Stage::Prepared;
        Ok(())
    }

    /// Split the prepared data into train/val/test partitions.
    ///
    /// The test fraction is carved from the whole dataset, then the
    /// validation fraction from what remains. Calling `setup()` again
    /// redraws the split and replaces the missing-configuration advisories
    /// of the previous call.
    pub fn setup(&mut self) -> DataModuleResult<()> {
        if self.stage < Stage::Prepared {
            return Err(DataModuleError::NotPrepared("setup"));
        }
        self.stage = Stage::Prepared;
        self.train = None;
        self.val = None;
        self.test = None;
        self.advisories
            .retain(|a| !matches!(a.kind, AdvisoryKind::MissingSplitConfig(_)));

        let data = self
            .data
            .as_ref()
            .ok_or(DataModuleError::NotPrepared("setup"))?;

        let default_splitter: Box<dyn Splitter> = if self.labels.is_some() {
            Box::new(StratifiedSplitter)
        } else {
            Box::new(ShuffleSplitter)
        };
        let splitter = self.splitter.as_deref().unwrap_or(default_splitter.as_ref());

        let mut rng = self.next_rng();
        let rows: Vec<usize> = (0..data.height()).collect();
        let codes = self.labels.as_ref().map(|labels| labels.select(&rows));
        let first = splitter.split(
            &rows,
            codes.as_deref(),
            self.config.train_test_split,
            &mut rng,
        )?;

        let remaining_codes = self.labels.as_ref().map(|labels| labels.select(&first.kept));
        let second = splitter.split(
            &first.kept,
            remaining_codes.as_deref(),
            self.config.train_val_split,
            &mut rng,
        )?;

        let train = self.partition(data, second.kept)?;
        let val = self.partition(data, second.held_out)?;
        let test = self.partition(data, first.held_out)?;

        log::info!(
            "Split {} rows into train={}, val={}, test={}",
            data.height(),
            train.len(),
            val.len(),
            test.len()
        );

        self.train = Some(train);
        self.val = Some(val);
        self.test = Some(test);

        for split in Split::ALL {
            let resolved = match self.config.split_config(split) {
                Some(conf) => conf.clone(),
                None => {
                    self.advisories.warn(
                        AdvisoryKind::MissingSplitConfig(split),
                        format!("no {} configuration given; using defaults", split),
                    );
                    SplitConfig::default()
                }
            };
            match split {
                Split::Train => self.train_conf = resolved,
                Split::Val => self.val_conf = resolved,
                Split::Test => self.test_conf = resolved,
            }
        }

        self.stage = Stage::SetUp;
        Ok(())
    }

    /// Loader over the training partition.
    ///
    /// Draws with inverse class-frequency weights when `weighted_sampling`
    /// is on, keeps per-batch class balance when `stratified_shuffle` is
    /// on, and shuffles uniformly otherwise.
    pub fn train_dataloader(&self) -> DataModuleResult<DataLoader> {
        let partition = self.set_up_partition(Split::Train, "train_dataloader")?;
        let batch_size = self.batch_size(&self.train_conf);

        let sampler: Box<dyn Sampler> = match partition.labels() {
            Some(labels) if self.config.weighted_sampling => {
                Box::new(WeightedRandomSampler::inverse_frequency(labels)?)
            }
            Some(labels) if self.config.stratified_shuffle => {
                Box::new(StratifiedBatchSampler::new(labels.to_vec(), batch_size))
            }
            _ => Box::new(RandomSampler::new(partition.len())),
        };

        self.loader(partition, &self.train_conf, sampler.as_ref())
    }

    /// Loader over the validation partition, in partition order unless
    /// its configuration asks for shuffling.
    pub fn val_dataloader(&self) -> DataModuleResult<DataLoader> {
        let partition = self.set_up_partition(Split::Val, "val_dataloader")?;
        self.evaluation_loader(partition, &self.val_conf)
    }

    /// Loader over the test partition, in partition order unless its
    /// configuration asks for shuffling.
    pub fn test_dataloader(&self) -> DataModuleResult<DataLoader> {
        let partition = self.set_up_partition(Split::Test, "test_dataloader")?;
        self.evaluation_loader(partition, &self.test_conf)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &DataModuleConfig {
        &self.config
    }

    /// Prepared data, once `prepare_data()` succeeded.
    pub fn data(&self) -> Option<&DataFrame> {
        self.data.as_ref()
    }

    /// Feature columns, once given or inferred.
    pub fn x_col(&self) -> Option<&[String]> {
        self.x_col.as_deref()
    }

    pub fn y_col(&self) -> &str {
        &self.config.y_col
    }

    pub fn labels(&self) -> Option<&ClassLabels> {
        self.labels.as_ref()
    }

    pub fn train(&self) -> Option<&Partition> {
        self.train.as_ref()
    }

    pub fn val(&self) -> Option<&Partition> {
        self.val.as_ref()
    }

    pub fn test(&self) -> Option<&Partition> {
        self.test.as_ref()
    }

    pub fn is_regression(&self) -> bool {
        self.config.is_regression
    }

    pub fn stratified_shuffle(&self) -> bool {
        self.config.stratified_shuffle
    }

    pub fn weighted_sampling(&self) -> bool {
        self.config.weighted_sampling
    }

    pub fn advisories(&self) -> &Advisories {
        &self.advisories
    }

    /// Back to `Created`, keeping construction-time advisories only.
    fn reset(&mut self) {
        self.stage = Stage::Created;
        self.data = None;
        self.labels = None;
        self.x_col = self.config.x_col.clone();
        self.train = None;
        self.val = None;
        self.test = None;
        self.train_conf = SplitConfig::default();
        self.val_conf = SplitConfig::default();
        self.test_conf = SplitConfig::default();
        self.advisories.retain(|a| {
            !matches!(
                a.kind,
                AdvisoryKind::InferredFeatureColumns | AdvisoryKind::MissingSplitConfig(_)
            )
        });
    }

    fn partition(&self, data: &DataFrame, indices: Vec<usize>) -> DataModuleResult<Partition> {
        let idx = IdxCa::from_vec("idx".into(), indices.iter().map(|&i| i as IdxSize).collect());
        let frame = data.take(&idx)?;
        let labels = self.labels.as_ref().map(|labels| labels.select(&indices));
        Ok(Partition {
            indices,
            frame,
            labels,
        })
    }

    fn set_up_partition(&self, split: Split, caller: &'static str) -> DataModuleResult<&Partition> {
        if self.stage != Stage::SetUp {
            return Err(DataModuleError::NotSetUp(caller));
        }
        let partition = match split {
            Split::Train => self.train.as_ref(),
            Split::Val => self.val.as_ref(),
            Split::Test => self.test.as_ref(),
        };
        partition.ok_or(DataModuleError::NotSetUp(caller))
    }

    fn batch_size(&self, conf: &SplitConfig) -> usize {
        conf.batch_size.unwrap_or(self.config.batch_size)
    }

    fn evaluation_loader(
        &self,
        partition: &Partition,
        conf: &SplitConfig,
    ) -> DataModuleResult<DataLoader> {
        let sampler: Box<dyn Sampler> = if conf.shuffle {
            Box::new(RandomSampler::new(partition.len()))
        } else {
            Box::new(SequentialSampler::new(partition.len()))
        };
        self.loader(partition, conf, sampler.as_ref())
    }

    fn loader(
        &self,
        partition: &Partition,
        conf: &SplitConfig,
        sampler: &dyn Sampler,
    ) -> DataModuleResult<DataLoader> {
        let mut rng = self.next_rng();
        let order = sampler.sample(&mut rng);
        let columns = ColumnSelection {
            x_col: self.x_col.clone().unwrap_or_default(),
            y_col: self.config.y_col.clone(),
        };
        DataLoader::new(
            partition.frame().clone(),
            order,
            self.batch_size(conf),
            columns,
            conf.is_tabular,
            conf.transform.clone(),
        )
    }

    /// Fresh random state. Every call advances the stream, so repeated
    /// loaders reshuffle; a configured seed makes the sequence reproducible.
    fn next_rng(&self) -> StdRng {
        let draw = self.draws.fetch_add(1, Ordering::Relaxed);
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ draw.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            None => StdRng::from_entropy(),
        }
    }
}

fn check_ratio(name: &'static str, value: f64) -> DataModuleResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DataModuleError::InvalidSplitRatio { name, value })
    }
}
