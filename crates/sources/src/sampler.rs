//! Injectable randomness for the candidate generators.
//!
//! Generators never touch a global RNG; they draw through a `Sampler` so
//! tests (and reproducible offline runs) can pass a seeded one.

use data_loader::AttractionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::{Mutex, PoisonError};

/// Source of uniform random sampling and shuffling
pub trait Sampler: Send + Sync {
    /// Uniform sample of `k` ids without replacement; all of them when `ids.len() <= k`
    fn sample(&self, ids: Vec<AttractionId>, k: usize) -> Vec<AttractionId>;

    /// Uniform in-place shuffle
    fn shuffle(&self, ids: &mut [AttractionId]);
}

/// `StdRng`-backed sampler, optionally seeded
pub struct RandomSampler {
    rng: Mutex<StdRng>,
}

impl RandomSampler {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sampler: identical seeds give identical draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Sampler for RandomSampler {
    fn sample(&self, mut ids: Vec<AttractionId>, k: usize) -> Vec<AttractionId> {
        if ids.len() <= k {
            return ids;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let (chosen, _) = ids.partial_shuffle(&mut *rng, k);
        chosen.to_vec()
    }

    fn shuffle(&self, ids: &mut [AttractionId]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ids.shuffle(&mut *rng);
    }
}
