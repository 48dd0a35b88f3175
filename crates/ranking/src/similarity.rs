//! Content-based ranking by cosine similarity.
//!
//! ## Algorithm
//! 1. Build a weighted `UserProfile` from the past attractions
//! 2. Normalize each candidate column over the candidate set only
//! 3. Form one unweighted six-dimensional vector per candidate
//! 4. Score every candidate by cosine similarity against the profile
//! 5. Stable descending sort, keep the first `limit`
//!
//! Weights are applied to the profile side only. Cosine similarity is
//! scale-invariant per vector, so the weights act as a direction bias on the
//! profile rather than as per-dimension importance on both sides.

use crate::error::{RankingError, Result};
use crate::normalize::normalize_column;
use crate::profile::UserProfile;
use crate::weights::{Feature, WeightSet};
use data_loader::FeatureVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Number of recommendations returned by default
pub const DEFAULT_CONTENT_LIMIT: usize = 10;

/// Cosine similarity of two equal-length vectors.
///
/// A zero magnitude on either side gives a denominator of 1, so the result
/// is 0 instead of NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denominator = mag_a * mag_b;
    let denominator = if denominator == 0.0 { 1.0 } else { denominator };
    dot / denominator
}

/// A candidate with its similarity to the user's profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAttraction {
    #[serde(flatten)]
    pub attraction: FeatureVector,
    pub similarity: f64,
}

/// Ranks unreviewed attractions against a user's review history
#[derive(Debug, Clone)]
pub struct ContentRanker {
    limit: usize,
}

impl Default for ContentRanker {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONTENT_LIMIT,
        }
    }
}

impl ContentRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Rank `candidates` by similarity to the profile built from `past`.
    ///
    /// # Returns
    /// At most `limit` candidates, similarity non-increasing. Ties keep
    /// their input order.
    #[instrument(skip_all, fields(past = past.len(), candidates = candidates.len()))]
    pub fn rank(
        &self,
        past: &[FeatureVector],
        candidates: Vec<FeatureVector>,
        weights: &WeightSet,
    ) -> Result<Vec<RankedAttraction>> {
        let profile = UserProfile::build(past, weights)?;
        debug!("Profile: {:?}", profile.as_slice());

        let columns = Feature::CONTENT
            .iter()
            .map(|&feature| normalize_column(&candidates, feature))
            .collect::<Result<Vec<Vec<f64>>>>()?;

        // Indexed parallel iterator: collect keeps row order
        let similarities: Vec<f64> = (0..candidates.len())
            .into_par_iter()
            .map(|row| {
                let vector: Vec<f64> = columns.iter().map(|column| column[row]).collect();
                cosine_similarity(profile.as_slice(), &vector)
            })
            .collect();

        let mut ranked: Vec<RankedAttraction> = candidates
            .into_iter()
            .zip(similarities)
            .map(|(attraction, similarity)| RankedAttraction {
                attraction,
                similarity,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(self.limit);

        debug!("Ranked {} candidates", ranked.len());
        Ok(ranked)
    }

    /// Rank untyped records as delivered by the storage layer.
    ///
    /// Both inputs must be JSON arrays of objects carrying the numeric
    /// fields of a `FeatureVector`; `saveCount` defaults to 0.
    pub fn rank_records(
        &self,
        past: &Value,
        candidates: &Value,
        weights: &WeightSet,
    ) -> Result<Vec<RankedAttraction>> {
        let past = records_to_features(past, "past")?;
        let candidates = records_to_features(candidates, "candidates")?;
        self.rank(&past, candidates, weights)
    }
}

/// Validate an untyped record array into feature vectors
pub fn records_to_features(records: &Value, label: &str) -> Result<Vec<FeatureVector>> {
    let array = records
        .as_array()
        .ok_or_else(|| RankingError::MalformedInput(format!("{} is not an array", label)))?;

    array
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if !record.is_object() {
                return Err(RankingError::MalformedInput(format!(
                    "{}[{}] is not an object",
                    label, i
                )));
            }
            FeatureVector::deserialize(record)
                .map_err(|e| RankingError::MalformedInput(format!("{}[{}]: {}", label, i, e)))
        })
        .collect()
}
