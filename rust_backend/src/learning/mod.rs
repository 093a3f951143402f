//! Data preparation for training loops.
//!
//! [`BaseDataModule`] turns a table into train/val/test loaders. The
//! statistical pieces sit behind small traits so the lifecycle and
//! validation logic can be exercised with any implementation:
//!
//! - [`splitter`]: [`Splitter`] carves held-out rows (stratified or shuffled)
//! - [`sampler`]: [`Sampler`] orders rows for one epoch (sequential, random,
//!   inverse-frequency weighted, stratified batches)
//! - [`transforms`]: [`Transform`] post-processes batches ([`ToTensor`])
//! - [`loader`]: [`DataLoader`] iterates batches of a partition
//! - [`config`]: module and per-split configuration, loadable from TOML/JSON
//! - [`advisory`]: record of recoverable misconfigurations

pub mod advisory;
pub mod config;
pub mod datamodule;
pub mod error;
pub mod labels;
pub mod loader;
pub mod sampler;
pub mod splitter;
pub mod transforms;


pub use advisory::{Advisories, Advisory, AdvisoryKind};
pub use config::{DataModuleConfig, Split, SplitConfig};
pub use datamodule::{BaseDataModule, DataSource, Partition, Stage};
pub use error::{DataModuleError, DataModuleResult};
pub use labels::{class_distribution, ClassLabels};
pub use loader::{Batch, ColumnSelection, DataLoader, TensorBatch};
pub use sampler::{
    RandomSampler, Sampler, SequentialSampler, StratifiedBatchSampler, WeightedRandomSampler,
};
pub use splitter::{ShuffleSplitter, SplitIndices, Splitter, StratifiedSplitter};
pub use transforms::{Compose, ToTensor, Transform};
