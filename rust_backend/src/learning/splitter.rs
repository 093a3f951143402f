//! Row splitting strategies.
//!
//! A [`Splitter`] carves a held-out fraction from a set of rows. The data
//! module applies it twice: test from the whole dataset, then validation
//! from what remains.
//!
//! Both strategies reserve `ceil(fraction * n)` rows, matching the usual
//! train/test split convention.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::error::{DataModuleError, DataModuleResult};
use super::labels::class_counts;

/// Result of one split: rows kept for the next stage and rows held out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitIndices {
    pub kept: Vec<usize>,
    pub held_out: Vec<usize>,
}

/// Capability that partitions rows into kept and held-out subsets.
pub trait Splitter: Send + Sync {
    /// Split `rows`, holding out `fraction` of them.
    ///
    /// `labels`, when given, holds the class code of each entry of `rows`.
    fn split(
        &self,
        rows: &[usize],
        labels: Option<&[usize]>,
        fraction: f64,
        rng: &mut dyn RngCore,
    ) -> DataModuleResult<SplitIndices>;
}

/// Uniformly random split, ignoring labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffleSplitter;

impl Splitter for ShuffleSplitter {
    fn split(
        &self,
        rows: &[usize],
        _labels: Option<&[usize]>,
        fraction: f64,
        rng: &mut dyn RngCore,
    ) -> DataModuleResult<SplitIndices> {
        let mut shuffled = rows.to_vec();
        shuffled.shuffle(rng);
        let held_out_len = held_out_size(rows.len(), fraction);
        let kept = shuffled.split_off(held_out_len);

        Ok(sorted(SplitIndices {
            kept,
            held_out: shuffled,
        }))
    }
}

/// Split that preserves class proportions in both subsets.
///
/// Each class contributes `floor(share)` rows to the held-out subset, where
/// `share` is its proportional part of the held-out size; the remaining
/// slots go to the classes with the largest fractional parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StratifiedSplitter;

impl Splitter for StratifiedSplitter {
    fn split(
        &self,
        rows: &[usize],
        labels: Option<&[usize]>,
        fraction: f64,
        rng: &mut dyn RngCore,
    ) -> DataModuleResult<SplitIndices> {
        let labels = labels.ok_or_else(|| {
            DataModuleError::Stratification("class labels are required".to_string())
        })?;
        if labels.len() != rows.len() {
            return Err(DataModuleError::Stratification(format!(
                "{} labels given for {} rows",
                labels.len(),
                rows.len()
            )));
        }

        let num_classes = labels.iter().copied().max().map_or(0, |max| max + 1);
        let counts = class_counts(labels, num_classes);
        if let Some(smallest) = counts.iter().copied().filter(|&c| c > 0).min() {
            if smallest < 2 {
                return Err(DataModuleError::Stratification(
                    "the least populated class has only 1 member".to_string(),
                ));
            }
        }

        let held_out_len = held_out_size(rows.len(), fraction);
        let allocation = allocate(&counts, held_out_len);

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
        for (&row, &code) in rows.iter().zip(labels) {
            members[code].push(row);
        }

        let mut split = SplitIndices::default();
        for (mut class_rows, take) in members.into_iter().zip(allocation) {
            class_rows.shuffle(rng);
            let kept = class_rows.split_off(take);
            split.held_out.extend(class_rows);
            split.kept.extend(kept);
        }

        log::debug!(
            "Stratified split over {} classes: kept {}, held out {}",
            num_classes,
            split.kept.len(),
            split.held_out.len()
        );

        Ok(sorted(split))
    }
}

fn held_out_size(total: usize, fraction: f64) -> usize {
    // Guard against products like 0.7 * 100 = 70.00000000000001.
    let size = (fraction * total as f64 - 1e-9).ceil().max(0.0) as usize;
    size.min(total)
}

fn allocate(counts: &[usize], held_out_len: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let shares: Vec<f64> = counts
        .iter()
        .map(|&count| held_out_len as f64 * count as f64 / total as f64)
        .collect();
    let mut allocation: Vec<usize> = shares.iter().map(|share| share.floor() as usize).collect();

    let mut remaining = held_out_len.saturating_sub(allocation.iter().sum());
    let mut by_remainder: Vec<usize> = (0..counts.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let frac_a = shares[a] - shares[a].floor();
        let frac_b = shares[b] - shares[b].floor();
        frac_b
            .total_cmp(&frac_a)
            .then_with(|| counts[b].cmp(&counts[a]))
    });

    for class in by_remainder {
        if remaining == 0 {
            break;
        }
        if allocation[class] < counts[class] {
            allocation[class] += 1;
            remaining -= 1;
        }
    }

    allocation
}

fn sorted(mut split: SplitIndices) -> SplitIndices {
    split.kept.sort_unstable();
    split.held_out.sort_unstable();
    split
}
