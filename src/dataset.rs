//! Bounded example store with replay-memory eviction.
//!
//! The dataset keeps `(feature, label)` pairs in three parallel vectors
//! (features, labels, insertion timestamps). When the store is full and
//! replay memory is enabled, one example is evicted per the configured
//! [`ForgetMode`]; with replay disabled, additions at capacity are rejected.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::scalar::Float;
use crate::{Error, Result};

/// Default capacity of a freshly created dataset.
pub const DEFAULT_MAX_EXAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Eviction policy applied when adding to a full dataset with replay memory
/// enabled.
pub enum ForgetMode {
    /// Remove the oldest example.
    Fifo,
    /// Remove a uniformly random example.
    RandomEqual,
    /// Remove a random example with probability proportional to its age.
    RandomOlder,
}

/// A bounded store of training pairs with selectable eviction.
#[derive(Debug, Clone)]
pub struct Dataset<F: Float> {
    features: Vec<Vec<F>>,
    labels: Vec<Vec<F>>,
    timestamps: Vec<u64>,
    next_timestamp: u64,
    max_examples: usize,
    replay_enabled: bool,
    forget_mode: ForgetMode,
    rng: StdRng,
}

impl<F: Float> Dataset<F> {
    /// Creates an empty dataset with the default capacity, FIFO eviction and
    /// replay memory disabled.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like [`Dataset::new`] but with a deterministic RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            timestamps: Vec::new(),
            next_timestamp: 0,
            max_examples: DEFAULT_MAX_EXAMPLES,
            replay_enabled: false,
            forget_mode: ForgetMode::Fifo,
            rng,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn max_examples(&self) -> usize {
        self.max_examples
    }

    #[inline]
    pub fn replay_enabled(&self) -> bool {
        self.replay_enabled
    }

    #[inline]
    pub fn forget_mode(&self) -> ForgetMode {
        self.forget_mode
    }

    /// Width of stored feature vectors, optionally counting the bias unit
    /// appended by [`Dataset::features`]. Zero while the dataset is empty.
    #[inline]
    pub fn feature_width(&self, with_bias: bool) -> usize {
        self.features
            .first()
            .map(|f| f.len() + usize::from(with_bias))
            .unwrap_or(0)
    }

    /// Width of stored label vectors. Zero while the dataset is empty.
    #[inline]
    pub fn label_width(&self) -> usize {
        self.labels.first().map(|l| l.len()).unwrap_or(0)
    }

    /// Appends one training pair.
    ///
    /// Widths must agree with the examples already stored
    /// ([`Error::ShapeMismatch`]). At capacity, replay memory evicts one
    /// example per the forget mode; with replay disabled the add is rejected
    /// ([`Error::CapacityExceeded`]).
    pub fn add(&mut self, feature: Vec<F>, label: Vec<F>) -> Result<()> {
        if let (Some(first_feature), Some(first_label)) =
            (self.features.first(), self.labels.first())
        {
            if feature.len() != first_feature.len() || label.len() != first_label.len() {
                return Err(Error::ShapeMismatch(format!(
                    "example widths ({}, {}) do not match dataset widths ({}, {})",
                    feature.len(),
                    label.len(),
                    first_feature.len(),
                    first_label.len()
                )));
            }
        }

        if self.features.len() >= self.max_examples {
            if self.replay_enabled {
                self.evict_one();
            } else {
                return Err(Error::CapacityExceeded(format!(
                    "dataset is full ({} examples)",
                    self.max_examples
                )));
            }
        }

        self.features.push(feature);
        self.labels.push(label);
        self.timestamps.push(self.next_timestamp);
        self.next_timestamp += 1;
        Ok(())
    }

    /// Removes one example per the current forget mode.
    fn evict_one(&mut self) {
        let index = match self.forget_mode {
            ForgetMode::Fifo => 0,
            ForgetMode::RandomEqual => self.rng.gen_range(0..self.features.len()),
            ForgetMode::RandomOlder => {
                let mut total_weight: u64 = 0;
                let mut weights = Vec::with_capacity(self.timestamps.len());
                for &t in &self.timestamps {
                    let age = self.next_timestamp - t;
                    weights.push(age);
                    total_weight += age;
                }
                if total_weight == 0 {
                    self.rng.gen_range(0..self.features.len())
                } else {
                    let r = self.rng.gen_range(0..total_weight);
                    let mut cumulative = 0;
                    let mut picked = 0;
                    for (i, &w) in weights.iter().enumerate() {
                        cumulative += w;
                        if r < cumulative {
                            picked = i;
                            break;
                        }
                    }
                    picked
                }
            }
        };

        self.features.remove(index);
        self.labels.remove(index);
        self.timestamps.remove(index);
    }

    /// Empties the dataset and resets the timestamp counter.
    pub fn clear(&mut self) {
        self.features.clear();
        self.labels.clear();
        self.timestamps.clear();
        self.next_timestamp = 0;
    }

    /// Replaces the contents wholesale, re-stamping timestamps `0..n`.
    pub fn load(&mut self, features: Vec<Vec<F>>, labels: Vec<Vec<F>>) -> Result<()> {
        if features.len() != labels.len() {
            return Err(Error::ShapeMismatch(format!(
                "feature count {} does not match label count {}",
                features.len(),
                labels.len()
            )));
        }
        if let Some(first) = features.first() {
            if features.iter().any(|f| f.len() != first.len()) {
                return Err(Error::ShapeMismatch(
                    "feature vectors have differing widths".to_owned(),
                ));
            }
        }
        if let Some(first) = labels.first() {
            if labels.iter().any(|l| l.len() != first.len()) {
                return Err(Error::ShapeMismatch(
                    "label vectors have differing widths".to_owned(),
                ));
            }
        }

        self.timestamps = (0..features.len() as u64).collect();
        self.next_timestamp = features.len() as u64;
        self.features = features;
        self.labels = labels;
        Ok(())
    }

    /// Returns a copy of the feature vectors, each with a `1.0` bias unit
    /// appended when `with_bias` is set.
    pub fn features(&self, with_bias: bool) -> Vec<Vec<F>> {
        self.features
            .iter()
            .map(|f| {
                let mut row = f.clone();
                if with_bias {
                    row.push(F::one());
                }
                row
            })
            .collect()
    }

    /// The stored label vectors, in insertion order.
    #[inline]
    pub fn labels(&self) -> &[Vec<F>] {
        &self.labels
    }

    /// Returns the whole dataset as a `(features, labels)` pair.
    ///
    /// With replay memory enabled the examples come back in a fresh uniformly
    /// shuffled order; otherwise in insertion order.
    pub fn sample(&mut self, with_bias: bool) -> (Vec<Vec<F>>, Vec<Vec<F>>) {
        if !self.replay_enabled || self.features.is_empty() {
            return (self.features(with_bias), self.labels.clone());
        }

        let mut indices: Vec<usize> = (0..self.features.len()).collect();
        indices.shuffle(&mut self.rng);

        let mut features = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for idx in indices {
            let mut row = self.features[idx].clone();
            if with_bias {
                row.push(F::one());
            }
            features.push(row);
            labels.push(self.labels[idx].clone());
        }
        (features, labels)
    }

    /// Changes the capacity, evicting (replay enabled) or right-truncating
    /// (replay disabled) until the dataset fits.
    pub fn set_max_examples(&mut self, max: usize) {
        self.max_examples = max;
        if self.replay_enabled {
            while self.features.len() > self.max_examples {
                self.evict_one();
            }
        } else if self.features.len() > self.max_examples {
            self.features.truncate(self.max_examples);
            self.labels.truncate(self.max_examples);
            self.timestamps.truncate(self.max_examples);
        }
    }

    pub fn set_replay_enabled(&mut self, enabled: bool) {
        self.replay_enabled = enabled;
    }

    pub fn set_forget_mode(&mut self, mode: ForgetMode) {
        self.forget_mode = mode;
    }

    #[cfg(test)]
    pub(crate) fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }
}

impl<F: Float> Default for Dataset<F> {
    fn default() -> Self {
        Self::new()
    }
}
