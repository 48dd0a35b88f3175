//! DataIndex building and query logic.
//!
//! This module builds the DataIndex from the parsed dataset and answers the
//! queries the recommenders consume:
//! - `reviewed_by` / `not_reviewed_by`: the two disjoint feature sets used by
//!   content-based ranking
//! - `popular_attractions`: the popularity-ordered shortlist used by
//!   location-aware scoring
//! - `most_saved`: the cold-start shortlist

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load the attraction dataset from a directory
    ///
    /// Steps:
    /// 1. Parse all files (in parallel)
    /// 2. Build primary indices
    /// 3. Compute per-attraction review aggregates
    /// 4. Validate data integrity
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading attraction dataset from {:?}", data_dir);

        let attractions_path = data_dir.join("attractions.json");
        let reviews_path = data_dir.join("reviews.json");
        let users_path = data_dir.join("users.json");
        let preferences_path = data_dir.join("preferences.json");
        let clusters_path = data_dir.join("clusters.json");
        let groups_path = data_dir.join("user_groups.json");

        // Reviews dominate the dataset, so they get their own branch
        let ((attractions, users), (reviews, (preferences, (clusters, groups)))) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_attractions(&attractions_path),
                    || parser::parse_users(&users_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_reviews(&reviews_path),
                    || {
                        (
                            parser::parse_preferences(&preferences_path),
                            (
                                parser::parse_clusters(&clusters_path),
                                parser::parse_user_groups(&groups_path),
                            ),
                        )
                    },
                )
            },
        );

        let attractions = attractions?;
        let users = users?;
        let reviews = reviews?;
        let preferences = preferences?;
        let clusters = clusters?;
        let groups = groups?;

        info!(
            "Loaded {} attractions, {} users, {} reviews, {} clusters, {} peer groups",
            attractions.len(),
            users.len(),
            reviews.len(),
            clusters.len(),
            groups.len()
        );

        let mut index = DataIndex::new();
        for attraction in attractions {
            index.insert_attraction(attraction);
        }
        for user in users {
            index.insert_user(user);
        }
        for review in reviews {
            index.insert_review(review);
        }
        for (user_id, categories) in preferences {
            index.insert_preferences(user_id, categories);
        }
        for members in clusters {
            index.insert_cluster(members);
        }
        for (signature, saved) in groups {
            index.insert_peer_group(signature, saved);
        }

        index.compute_attraction_stats();
        index.validate()?;

        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Compute review aggregates for every reviewed attraction
    ///
    /// Equivalent to grouping all reviews by attraction and taking the
    /// count and the mean of both scores.
    pub fn compute_attraction_stats(&mut self) {
        self.attraction_stats = self
            .attraction_reviews
            .par_iter()
            .filter(|(_, reviews)| !reviews.is_empty())
            .map(|(attraction_id, reviews)| {
                let review_count = reviews.len() as u32;
                let green_total: f64 = reviews.iter().map(|r| r.green_score).sum();
                let like_total: f64 = reviews.iter().map(|r| r.like_score).sum();
                (
                    attraction_id.clone(),
                    AttractionStats {
                        review_count,
                        avg_green_score: green_total / review_count as f64,
                        avg_like_score: like_total / review_count as f64,
                    },
                )
            })
            .collect();
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every review references a known attraction
    /// - both review scores are in 0-5
    /// - every coordinate is finite
    pub fn validate(&self) -> Result<()> {
        for reviews in self.user_reviews.values() {
            for review in reviews {
                if !self.attractions.contains_key(&review.attraction_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Attraction".to_string(),
                        id: review.attraction_id.clone(),
                    });
                }
                for (field, score) in [
                    ("green_score", review.green_score),
                    ("like_score", review.like_score),
                ] {
                    if !(0.0..=5.0).contains(&score) {
                        return Err(DataLoadError::InvalidValue {
                            field: field.to_string(),
                            value: score.to_string(),
                        });
                    }
                }
            }
        }
        for attraction in self.attractions.values() {
            if !attraction.latitude.is_finite() || !attraction.longitude.is_finite() {
                return Err(DataLoadError::ValidationError(format!(
                    "attraction {} has non-finite coordinates",
                    attraction.id
                )));
            }
        }
        Ok(())
    }

    /// Feature vector for one attraction, if it has metadata and reviews
    pub fn feature_vector(&self, attraction_id: &str) -> Option<FeatureVector> {
        let attraction = self.get_attraction(attraction_id)?;
        let stats = self.get_attraction_stats(attraction_id)?;
        Some(FeatureVector::from_parts(attraction, stats))
    }

    /// Attractions the user has reviewed, with their global aggregates
    ///
    /// Ordered by attraction id so repeated calls are identical.
    pub fn reviewed_by(&self, user_id: &str) -> Vec<FeatureVector> {
        let reviewed = self.reviewed_ids(user_id);
        self.reviewed_features(|id| reviewed.contains(id))
    }

    /// Reviewed attractions the user has not reviewed themself
    ///
    /// Disjoint from `reviewed_by` for the same user.
    pub fn not_reviewed_by(&self, user_id: &str) -> Vec<FeatureVector> {
        let reviewed = self.reviewed_ids(user_id);
        self.reviewed_features(|id| !reviewed.contains(id))
    }

    /// Popularity shortlist for location-aware scoring
    ///
    /// Sorted by (reviewCount, avgGreenScore, avgLikeScore, saveCount), all
    /// descending, then truncated to `limit`. Attractions without metadata
    /// never appear.
    pub fn popular_attractions(&self, limit: usize) -> Vec<FeatureVector> {
        let mut ranked = self.reviewed_features(|_| true);
        ranked.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then_with(|| desc_f64(a.avg_green_score, b.avg_green_score))
                .then_with(|| desc_f64(a.avg_like_score, b.avg_like_score))
                .then_with(|| b.save_count.cmp(&a.save_count))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Most-saved attractions, ties broken by id
    pub fn most_saved(&self, limit: usize) -> Vec<&Attraction> {
        let mut attractions: Vec<&Attraction> = self.attractions.values().collect();
        attractions.sort_by(|a, b| b.save_count.cmp(&a.save_count).then_with(|| a.id.cmp(&b.id)));
        attractions.truncate(limit);
        attractions
    }

    fn reviewed_ids(&self, user_id: &str) -> HashSet<&str> {
        self.get_user_reviews(user_id)
            .iter()
            .map(|r| r.attraction_id.as_str())
            .collect()
    }

    /// Join stats with metadata for every attraction passing `keep`, by id
    fn reviewed_features(&self, keep: impl Fn(&str) -> bool) -> Vec<FeatureVector> {
        let mut ids: Vec<&String> = self
            .attraction_stats
            .keys()
            .filter(|id| keep(id.as_str()))
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.feature_vector(id))
            .collect()
    }
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attraction(id: &str, save_count: u32) -> Attraction {
        Attraction {
            id: id.to_string(),
            title: format!("Attraction {}", id),
            city: Some("Melbourne".to_string()),
            image_url: None,
            latitude: -37.8,
            longitude: 144.9,
            save_count,
        }
    }

    fn review(attraction_id: &str, user_id: &str, green: f64, like: f64) -> Review {
        Review {
            attraction_id: attraction_id.to_string(),
            user_id: user_id.to_string(),
            green_score: green,
            like_score: like,
        }
    }

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_attraction(attraction("a", 3));
        index.insert_attraction(attraction("b", 10));
        index.insert_attraction(attraction("c", 1));
        index.insert_attraction(attraction("d", 0)); // never reviewed

        index.insert_review(review("a", "u1", 4.0, 5.0));
        index.insert_review(review("a", "u2", 2.0, 3.0));
        index.insert_review(review("b", "u2", 5.0, 5.0));
        index.insert_review(review("c", "u3", 3.0, 1.0));
        index.insert_review(review("c", "u1", 3.0, 3.0));

        index.compute_attraction_stats();
        index
    }

    #[test]
    fn test_compute_attraction_stats() {
        let index = create_test_index();
        let stats = index.get_attraction_stats("a").unwrap();
        assert_eq!(stats.review_count, 2);
        assert!((stats.avg_green_score - 3.0).abs() < 1e-9);
        assert!((stats.avg_like_score - 4.0).abs() < 1e-9);
        assert!(index.get_attraction_stats("d").is_none());
    }

    #[test]
    fn test_reviewed_sets_are_disjoint() {
        let index = create_test_index();
        let past: Vec<_> = index.reviewed_by("u1").into_iter().map(|f| f.attraction_id).collect();
        let candidates: Vec<_> = index
            .not_reviewed_by("u1")
            .into_iter()
            .map(|f| f.attraction_id)
            .collect();

        assert_eq!(past, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(candidates, vec!["b".to_string()]);
    }

    #[test]
    fn test_unknown_user_has_no_history() {
        let index = create_test_index();
        assert!(index.reviewed_by("nobody").is_empty());
        assert_eq!(index.not_reviewed_by("nobody").len(), 3);
    }

    #[test]
    fn test_popular_attractions_ordering() {
        let index = create_test_index();
        let popular = index.popular_attractions(5);
        let ids: Vec<_> = popular.iter().map(|f| f.attraction_id.as_str()).collect();
        // a and c both have 2 reviews; a has the higher green score
        assert_eq!(ids, vec!["a", "c", "b"]);

        let top = index.popular_attractions(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].attraction_id, "a");
    }

    #[test]
    fn test_most_saved() {
        let index = create_test_index();
        let ids: Vec<_> = index.most_saved(2).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_validate_rejects_unknown_attraction() {
        let mut index = create_test_index();
        index.insert_review(review("ghost", "u1", 1.0, 1.0));
        assert!(matches!(
            index.validate(),
            Err(DataLoadError::MissingReference { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let mut index = create_test_index();
        index.insert_review(review("a", "u9", 7.5, 1.0));
        assert!(matches!(
            index.validate(),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_dataset() {
        // Requires a dataset export under ../../data/sample
        let data_dir = Path::new("../../data/sample");

        if data_dir.exists() {
            let index = DataIndex::load_from_dir(data_dir).unwrap();
            let (attractions, _users, reviews) = index.counts();
            assert!(attractions > 0);
            assert!(reviews > 0);
        }
    }
}
