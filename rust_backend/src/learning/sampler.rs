//! Epoch orderings over a partition.
//!
//! A [`Sampler`] decides which partition rows a loader visits during one
//! epoch and in what order. Positions are relative to the partition, not
//! to the full dataset.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::fmt;

use super::error::{DataModuleError, DataModuleResult};
use super::labels::class_counts;

/// Capability that produces the visiting order of one epoch.
pub trait Sampler: Send + Sync + fmt::Debug {
    /// Number of positions produced per epoch.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions to visit, in order.
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<usize>;
}

/// Visits every row once, in partition order.
#[derive(Debug, Clone, Copy)]
pub struct SequentialSampler {
    len: usize,
}

impl SequentialSampler {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Sampler for SequentialSampler {
    fn len(&self) -> usize {
        self.len
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> Vec<usize> {
        (0..self.len).collect()
    }
}

/// Visits every row once, in a fresh random order.
#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    len: usize,
}

impl RandomSampler {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Sampler for RandomSampler {
    fn len(&self) -> usize {
        self.len
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len).collect();
        order.shuffle(rng);
        order
    }
}

/// Draws rows with replacement according to per-row weights.
#[derive(Debug, Clone)]
pub struct WeightedRandomSampler {
    distribution: WeightedIndex<f64>,
    num_samples: usize,
}

impl WeightedRandomSampler {
    pub fn new(weights: &[f64], num_samples: usize) -> DataModuleResult<Self> {
        let distribution = WeightedIndex::new(weights)
            .map_err(|e| DataModuleError::Sampling(format!("invalid sample weights: {}", e)))?;
        Ok(Self {
            distribution,
            num_samples,
        })
    }

    /// Weight every row by the inverse frequency of its class, so that each
    /// class is drawn equally often in expectation. One epoch draws as many
    /// rows as there are labels.
    pub fn inverse_frequency(labels: &[usize]) -> DataModuleResult<Self> {
        let weights = inverse_frequency_weights(labels);
        Self::new(&weights, labels.len())
    }
}

impl Sampler for WeightedRandomSampler {
    fn len(&self) -> usize {
        self.num_samples
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<usize> {
        (0..self.num_samples)
            .map(|_| self.distribution.sample(rng))
            .collect()
    }
}

/// Orders rows so that every batch keeps the class proportions of the
/// partition.
///
/// Each class is spread evenly over the epoch: the `k`-th row of a class
/// with `n` members lands at relative position `(k + u) / n`, with `u`
/// drawn once per class and epoch. Rows are then ordered by position and
/// shuffled within each batch.
#[derive(Debug, Clone)]
pub struct StratifiedBatchSampler {
    labels: Vec<usize>,
    batch_size: usize,
}

impl StratifiedBatchSampler {
    pub fn new(labels: Vec<usize>, batch_size: usize) -> Self {
        Self {
            labels,
            batch_size: batch_size.max(1),
        }
    }
}

impl Sampler for StratifiedBatchSampler {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<usize> {
        let num_classes = self.labels.iter().copied().max().map_or(0, |max| max + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
        for (position, &code) in self.labels.iter().enumerate() {
            members[code].push(position);
        }

        let mut keyed: Vec<(f64, usize)> = Vec::with_capacity(self.labels.len());
        for mut class_positions in members {
            if class_positions.is_empty() {
                continue;
            }
            class_positions.shuffle(rng);
            let offset: f64 = rng.gen();
            let n = class_positions.len() as f64;
            keyed.extend(
                class_positions
                    .into_iter()
                    .enumerate()
                    .map(|(rank, position)| ((rank as f64 + offset) / n, position)),
            );
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut order: Vec<usize> = keyed.into_iter().map(|(_, position)| position).collect();
        for batch in order.chunks_mut(self.batch_size) {
            batch.shuffle(rng);
        }
        order
    }
}

/// Per-row weights `1 / count(class)`.
pub fn inverse_frequency_weights(labels: &[usize]) -> Vec<f64> {
    let num_classes = labels.iter().copied().max().map_or(0, |max| max + 1);
    let counts = class_counts(labels, num_classes);
    labels
        .iter()
        .map(|&code| 1.0 / counts[code] as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::labels::class_distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn imbalanced_labels() -> Vec<usize> {
        (0..100).map(|i| usize::from(i < 80)).collect()
    }

    #[test]
    fn test_sequential_order() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(SequentialSampler::new(4).sample(&mut rng), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_random_sampler_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut order = RandomSampler::new(50).sample(&mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_inverse_frequency_weights() {
        let weights = inverse_frequency_weights(&[0, 1, 1, 1]);
        assert_eq!(weights, vec![1.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
    }

    #[test]
    fn test_weighted_sampler_balances_classes() {
        let labels = imbalanced_labels();
        let sampler = WeightedRandomSampler::inverse_frequency(&labels).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let drawn: Vec<usize> = (0..50)
            .flat_map(|_| sampler.sample(&mut rng))
            .map(|position| labels[position])
            .collect();

        assert_eq!(drawn.len(), 5000);
        let dist = class_distribution(&drawn, 2);
        assert!((dist[0] - dist[1]).abs() < 0.1, "{:?}", dist);
    }

    #[test]
    fn test_weighted_sampler_rejects_empty_partition() {
        let err = WeightedRandomSampler::inverse_frequency(&[]).unwrap_err();
        assert!(matches!(err, DataModuleError::Sampling(_)));
    }

    #[test]
    fn test_stratified_batches_keep_proportions() {
        let labels = imbalanced_labels();
        let sampler = StratifiedBatchSampler::new(labels.clone(), 10);
        let mut rng = StdRng::seed_from_u64(3);

        let order = sampler.sample(&mut rng);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());

        for batch in order.chunks(10) {
            let minority = batch.iter().filter(|&&p| labels[p] == 0).count();
            assert!((1..=3).contains(&minority), "batch {:?}", batch);
        }
    }
}
