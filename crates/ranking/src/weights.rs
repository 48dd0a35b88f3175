//! Feature columns and the weights applied to them.
//!
//! `Feature` is the closed set of numeric columns a ranker can read from a
//! `FeatureVector`. `WeightSet` maps features to non-negative weights; a
//! feature absent from the set has weight 0.

use crate::composite::parse_distance;
use crate::error::{RankingError, Result};
use data_loader::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One numeric column of a `FeatureVector`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    AvgGreenScore,
    AvgLikeScore,
    Latitude,
    Longitude,
    ReviewCount,
    SaveCount,
    /// Parsed travel distance (only present in the location-aware pipeline)
    #[serde(rename = "distanceNorm")]
    Distance,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::AvgGreenScore,
        Feature::AvgLikeScore,
        Feature::Latitude,
        Feature::Longitude,
        Feature::ReviewCount,
        Feature::SaveCount,
        Feature::Distance,
    ];

    /// Dimensions of a content-based profile, in vector order
    pub const CONTENT: [Feature; 6] = [
        Feature::AvgGreenScore,
        Feature::AvgLikeScore,
        Feature::Latitude,
        Feature::Longitude,
        Feature::ReviewCount,
        Feature::SaveCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::AvgGreenScore => "avgGreenScore",
            Feature::AvgLikeScore => "avgLikeScore",
            Feature::Latitude => "latitude",
            Feature::Longitude => "longitude",
            Feature::ReviewCount => "reviewCount",
            Feature::SaveCount => "saveCount",
            Feature::Distance => "distanceNorm",
        }
    }

    /// Read this column from a feature vector
    ///
    /// `Distance` parses the gateway's distance text and fails when it is
    /// missing or has no leading number.
    pub fn value(self, fv: &FeatureVector) -> Result<f64> {
        Ok(match self {
            Feature::AvgGreenScore => fv.avg_green_score,
            Feature::AvgLikeScore => fv.avg_like_score,
            Feature::Latitude => fv.latitude,
            Feature::Longitude => fv.longitude,
            Feature::ReviewCount => f64::from(fv.review_count),
            Feature::SaveCount => f64::from(fv.save_count),
            Feature::Distance => match fv.distance.as_deref() {
                Some(text) => parse_distance(text)?,
                None => {
                    return Err(RankingError::DistanceParse { raw: String::new() });
                }
            },
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated mapping from feature to weight.
///
/// Deserializes from a JSON object such as `{"avgGreenScore": 0.3, ...}`
/// and rejects negative or non-finite weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Feature, f64>",
    into = "BTreeMap<Feature, f64>"
)]
pub struct WeightSet {
    weights: BTreeMap<Feature, f64>,
}

impl WeightSet {
    pub fn new(weights: impl IntoIterator<Item = (Feature, f64)>) -> Result<Self> {
        let weights: BTreeMap<Feature, f64> = weights.into_iter().collect();
        for (&feature, &weight) in &weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankingError::InvalidWeight { feature, weight });
            }
        }
        Ok(Self { weights })
    }

    /// Weights used to build content-based profiles
    pub fn content_based() -> Self {
        Self::preset(&[
            (Feature::AvgGreenScore, 0.30),
            (Feature::AvgLikeScore, 0.25),
            (Feature::Latitude, 0.10),
            (Feature::Longitude, 0.10),
            (Feature::ReviewCount, 0.15),
            (Feature::SaveCount, 0.10),
        ])
    }

    /// Weights used by the location-aware composite score
    pub fn composite() -> Self {
        Self::preset(&[
            (Feature::AvgGreenScore, 0.30),
            (Feature::AvgLikeScore, 0.25),
            (Feature::Distance, 0.20),
            (Feature::ReviewCount, 0.15),
            (Feature::SaveCount, 0.10),
        ])
    }

    fn preset(pairs: &[(Feature, f64)]) -> Self {
        Self {
            weights: pairs.iter().copied().collect(),
        }
    }

    /// Weight of `feature`, 0 when unset
    pub fn weight(&self, feature: Feature) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.weights.iter().map(|(&f, &w)| (f, w))
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

impl TryFrom<BTreeMap<Feature, f64>> for WeightSet {
    type Error = RankingError;

    fn try_from(weights: BTreeMap<Feature, f64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl From<WeightSet> for BTreeMap<Feature, f64> {
    fn from(set: WeightSet) -> Self {
        set.weights
    }
}
