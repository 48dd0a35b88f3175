//! Weighted-sum composite scoring for location-aware recommendations.
//!
//! Each candidate already carries its popularity aggregates and a travel
//! distance string from the geo gateway. Scoring:
//! 1. Parse the distance text into a number
//! 2. Min-max normalize every feature over the candidate set
//! 3. Invert distance (`1 - norm`) so nearer is better
//! 4. `compositeScore = Σ weight_f * value_f`
//! 5. Stable descending sort

use crate::error::{RankingError, Result};
use crate::normalize::{normalize, normalize_column};
use crate::weights::{Feature, WeightSet};
use data_loader::FeatureVector;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Parse the leading number of a distance string such as `"1,234.5 km"`.
///
/// Only the first whitespace-separated token is read, thousands separators
/// are stripped and the longest numeric prefix wins. Units are ignored, so
/// `"850 m"` parses as 850.
pub fn parse_distance(text: &str) -> Result<f64> {
    let token: String = text
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|&c| c != ',')
        .collect();

    // Restrict to number-ish characters so "NaN"/"inf" never parse
    let candidate_len = token
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let candidate = &token[..candidate_len];

    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| RankingError::DistanceParse {
            raw: text.to_string(),
        })
}

/// A candidate with its composite score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScored {
    #[serde(flatten)]
    pub attraction: FeatureVector,
    pub composite_score: f64,
    /// Parsed leading number of the distance text
    pub distance_km: f64,
    /// Inverted, normalized distance (1 = nearest)
    pub distance_norm: f64,
}

/// Scores nearby candidates by a weighted sum of normalized features
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer;

impl CompositeScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score and rank `attractions`, which must all carry a distance.
    ///
    /// Fails with `DistanceParse` if any distance is missing or unparseable.
    #[instrument(skip_all, fields(candidates = attractions.len()))]
    pub fn score(
        &self,
        attractions: Vec<FeatureVector>,
        weights: &WeightSet,
    ) -> Result<Vec<CompositeScored>> {
        let distances = attractions
            .iter()
            .map(|a| Feature::Distance.value(a))
            .collect::<Result<Vec<f64>>>()?;
        let distance_norm: Vec<f64> = normalize(&distances).into_iter().map(|n| 1.0 - n).collect();

        let mut columns: Vec<(f64, Vec<f64>)> = Vec::new();
        for (feature, weight) in weights.iter() {
            if feature == Feature::Distance || weight == 0.0 {
                continue;
            }
            columns.push((weight, normalize_column(&attractions, feature)?));
        }
        let distance_weight = weights.weight(Feature::Distance);

        let mut scored: Vec<CompositeScored> = attractions
            .into_iter()
            .enumerate()
            .map(|(row, attraction)| {
                let composite_score = columns
                    .iter()
                    .map(|(weight, column)| weight * column[row])
                    .sum::<f64>()
                    + distance_weight * distance_norm[row];
                CompositeScored {
                    attraction,
                    composite_score,
                    distance_km: distances[row],
                    distance_norm: distance_norm[row],
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(Ordering::Equal)
        });

        debug!("Scored {} candidates", scored.len());
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearby(id: &str, distance: &str, reviews: u32, green: f64, like: f64, saves: u32) -> FeatureVector {
        FeatureVector {
            attraction_id: id.to_string(),
            title: id.to_string(),
            city: None,
            image_url: None,
            review_count: reviews,
            avg_green_score: green,
            avg_like_score: like,
            save_count: saves,
            latitude: 0.0,
            longitude: 0.0,
            distance: Some(distance.to_string()),
            duration: Some("5 mins".to_string()),
        }
    }

    #[test]
    fn test_parse_distance_formats() {
        assert_eq!(parse_distance("12.3 km").unwrap(), 12.3);
        assert_eq!(parse_distance("1,234.5 km").unwrap(), 1234.5);
        assert_eq!(parse_distance("850 m").unwrap(), 850.0);
        assert_eq!(parse_distance("7km").unwrap(), 7.0);
        assert_eq!(parse_distance("  3 mi").unwrap(), 3.0);
    }

    #[test]
    fn test_parse_distance_rejects_non_numeric() {
        assert!(matches!(
            parse_distance("far away"),
            Err(RankingError::DistanceParse { .. })
        ));
        assert!(parse_distance("").is_err());
        assert!(parse_distance("NaN km").is_err());
    }

    #[test]
    fn test_nearest_gets_full_distance_weight() {
        let candidates = vec![
            nearby("far", "10 km", 5, 3.0, 3.0, 1),
            nearby("near", "1 km", 5, 3.0, 3.0, 1),
            nearby("mid", "5 km", 5, 3.0, 3.0, 1),
        ];
        let scored = CompositeScorer::new()
            .score(candidates, &WeightSet::composite())
            .unwrap();

        assert_eq!(scored[0].attraction.attraction_id, "near");
        assert_eq!(scored[0].distance_norm, 1.0);
        assert!((scored[0].composite_score - 0.20).abs() < 1e-12);
        assert_eq!(scored[2].attraction.attraction_id, "far");
        assert_eq!(scored[2].distance_norm, 0.0);
    }

    #[test]
    fn test_scores_non_increasing() {
        let candidates = vec![
            nearby("a", "3 km", 10, 4.0, 2.0, 0),
            nearby("b", "8 km", 2, 5.0, 5.0, 9),
            nearby("c", "1 km", 7, 1.0, 4.0, 3),
            nearby("d", "2,500 km", 1, 2.0, 1.0, 1),
            nearby("e", "12 km", 4, 3.5, 3.0, 5),
        ];
        let scored = CompositeScorer::new()
            .score(candidates, &WeightSet::composite())
            .unwrap();
        assert_eq!(scored.len(), 5);
        for pair in scored.windows(2) {
            assert!(pair[0].composite_score >= pair[1].composite_score);
        }
    }

    #[test]
    fn test_missing_distance_fails() {
        let mut candidate = nearby("a", "3 km", 1, 1.0, 1.0, 1);
        candidate.distance = None;
        assert!(matches!(
            CompositeScorer::new().score(vec![candidate], &WeightSet::composite()),
            Err(RankingError::DistanceParse { .. })
        ));
    }

    #[test]
    fn test_single_candidate_scores_zero() {
        let scored = CompositeScorer::new()
            .score(vec![nearby("only", "4 km", 3, 3.0, 3.0, 3)], &WeightSet::composite())
            .unwrap();
        // Every column collapses to zero; inverted distance is 1
        assert!((scored[0].composite_score - 0.20).abs() < 1e-12);
    }
}
