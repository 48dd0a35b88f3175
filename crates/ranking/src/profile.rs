//! User profiles for content-based ranking.
//!
//! A profile is the weighted mean of the user's past attractions over the six
//! content dimensions (`Feature::CONTENT`), each dimension normalized over the
//! past set only. Profiles are rebuilt per request.

use crate::error::{RankingError, Result};
use crate::normalize::normalize_column;
use crate::weights::{Feature, WeightSet};
use data_loader::FeatureVector;

/// Weighted six-dimensional summary of a user's history
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    values: [f64; 6],
}

impl UserProfile {
    /// Build a profile from the user's past attractions.
    ///
    /// Returns `EmptyHistory` for an empty `past`; enforcing a minimum history
    /// length is up to the caller.
    pub fn build(past: &[FeatureVector], weights: &WeightSet) -> Result<Self> {
        if past.is_empty() {
            return Err(RankingError::EmptyHistory);
        }

        let mut values = [0.0; 6];
        for (slot, feature) in values.iter_mut().zip(Feature::CONTENT) {
            let column = normalize_column(past, feature)?;
            let mean = column.iter().sum::<f64>() / column.len() as f64;
            *slot = weights.weight(feature) * mean;
        }

        Ok(Self { values })
    }

    /// Profile in `Feature::CONTENT` order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        Feature::CONTENT
            .iter()
            .position(|&f| f == feature)
            .map(|i| self.values[i])
    }
}
