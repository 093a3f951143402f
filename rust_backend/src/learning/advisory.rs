//! Recoverable misconfigurations.
//!
//! The data module corrects some configuration mistakes on its own (forcing
//! an incompatible flag off, inferring feature columns, falling back to a
//! default split configuration). Each correction is logged as a warning and
//! recorded as an [`Advisory`] so callers can inspect what was changed.

use serde::Serialize;
use std::fmt;

use super::config::Split;

/// What was corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdvisoryKind {
    /// `stratified_shuffle` was requested for a regression target and turned off.
    StratifiedShuffleDisabled,
    /// `weighted_sampling` was requested for a regression target and turned off.
    WeightedSamplingDisabled,
    /// No feature columns were given; all non-target columns are used.
    InferredFeatureColumns,
    /// No configuration was given for a split; defaults are used.
    MissingSplitConfig(Split),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Advisories raised by a data module, in the order they were raised.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Advisories(Vec<Advisory>);

impl Advisories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an advisory and emit it as a warning.
    pub fn warn(&mut self, kind: AdvisoryKind, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.0.push(Advisory { kind, message });
    }

    pub fn contains(&self, kind: AdvisoryKind) -> bool {
        self.0.iter().any(|a| a.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Advisory> {
        self.0.iter()
    }

    /// Keep only the advisories for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Advisory) -> bool) {
        self.0.retain(keep);
    }
}

impl<'a> IntoIterator for &'a Advisories {
    type Item = &'a Advisory;
    type IntoIter = std::slice::Iter<'a, Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
