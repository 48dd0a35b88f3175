//! # Recommendation Orchestrator
//!
//! This module exposes the recommendation entry points and wires each to
//! its strategy:
//! 1. Content-based: review history -> profile -> cosine ranking
//! 2. Location-aware: popularity shortlist -> distance fan-out -> composite score
//! 3. Cluster: recent saves -> similarity clusters -> random sample
//! 4. Peer group: preference signature -> co-saves -> random sample
//!
//! Strategies are independent; results go back to distinct call sites and
//! are never merged here.
//!
//! ## Concurrency
//! Ranking is CPU-bound and runs on `spawn_blocking`. The distance lookups
//! are the only I/O: they run concurrently through `buffer_unordered`, each
//! under its own timeout, and are re-associated by attraction id. A failed
//! or timed-out lookup drops that candidate instead of failing the batch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use data_loader::{AttractionId, DataIndex, FeatureVector, PreferenceSignature};
use geo_client::{Coordinates, DistanceGateway, GatewayError, TravelEstimate};
use ranking::{
    CompositeScored, CompositeScorer, ContentRanker, RankedAttraction, RankingError,
    parse_distance,
};
use sources::{
    ClusterSource, InMemoryPeerGroups, MostSavedSource, PeerGroupSource, PeerGroupStore,
    RandomSampler, RecommendedItem, Sampler,
};

use crate::config::RecommenderConfig;

/// Errors surfaced by the recommendation entry points.
///
/// Gateway failures never appear here: each one only drops its candidate.
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Not enough review history: found {found}, need at least {required}")]
    InsufficientHistory { found: usize, required: usize },

    #[error("Location-aware recommendations need both latitude and longitude")]
    MissingLocation,

    #[error("Unknown attraction {0}")]
    UnknownAttraction(AttractionId),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error("Ranking task failed: {0}")]
    Task(String),
}

/// Location-aware result, trimmed to what the client displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecommendation {
    #[serde(rename = "_id")]
    pub id: AttractionId,
    pub title: String,
    pub city: Option<String>,
    pub image_url: Option<String>,
    pub distance: String,
    pub duration: String,
    pub composite_score: f64,
}

impl From<CompositeScored> for LocationRecommendation {
    fn from(scored: CompositeScored) -> Self {
        let attraction = scored.attraction;
        Self {
            id: attraction.attraction_id,
            title: attraction.title,
            city: attraction.city,
            image_url: attraction.image_url,
            distance: attraction.distance.unwrap_or_default(),
            duration: attraction.duration.unwrap_or_default(),
            composite_score: scored.composite_score,
        }
    }
}

/// Main orchestrator that coordinates the recommendation strategies
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    data_index: Arc<DataIndex>,
    gateway: Arc<dyn DistanceGateway>,
    peer_groups: Arc<dyn PeerGroupStore>,
    cluster: Arc<ClusterSource>,
    peers: Arc<PeerGroupSource>,
    most_saved: Arc<MostSavedSource>,
    ranker: ContentRanker,
    scorer: CompositeScorer,
    config: RecommenderConfig,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator with an entropy-seeded sampler and an
    /// in-memory peer-group store seeded from `data_index`
    pub fn new(
        data_index: Arc<DataIndex>,
        gateway: Arc<dyn DistanceGateway>,
        config: RecommenderConfig,
    ) -> Self {
        let peer_groups = Arc::new(InMemoryPeerGroups::from_index(&data_index));
        Self::with_components(
            data_index,
            gateway,
            peer_groups,
            Arc::new(RandomSampler::from_entropy()),
            config,
        )
    }

    /// Create an orchestrator around an external peer-group store and sampler
    pub fn with_components(
        data_index: Arc<DataIndex>,
        gateway: Arc<dyn DistanceGateway>,
        peer_groups: Arc<dyn PeerGroupStore>,
        sampler: Arc<dyn Sampler>,
        config: RecommenderConfig,
    ) -> Self {
        let cluster = ClusterSource::new(data_index.clone(), sampler.clone())
            .with_sample_size(config.generator_sample_size)
            .with_recent_saves(config.recent_saves);
        let peers = PeerGroupSource::new(data_index.clone(), peer_groups.clone(), sampler)
            .with_sample_size(config.generator_sample_size);
        let most_saved = MostSavedSource::new(data_index.clone());
        let ranker = ContentRanker::new().with_limit(config.content_limit);

        Self {
            data_index,
            gateway,
            peer_groups,
            cluster: Arc::new(cluster),
            peers: Arc::new(peers),
            most_saved: Arc::new(most_saved),
            ranker,
            scorer: CompositeScorer::new(),
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    /// Rank the attractions a user has not reviewed against their review history
    ///
    /// # Returns
    /// At most `content_limit` attractions, similarity non-increasing, or
    /// `InsufficientHistory` when the user reviewed fewer than `min_history`.
    #[instrument(skip(self))]
    pub async fn get_content_based_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<RankedAttraction>, RecommendError> {
        let start_time = Instant::now();

        let past = self.data_index.reviewed_by(user_id);
        if past.len() < self.config.min_history {
            return Err(RecommendError::InsufficientHistory {
                found: past.len(),
                required: self.config.min_history,
            });
        }
        let candidates = self.data_index.not_reviewed_by(user_id);
        debug!(
            "Ranking {} candidates against {} past attractions",
            candidates.len(),
            past.len()
        );

        let ranker = self.ranker.clone();
        let weights = self.config.content_weights.clone();
        let ranked = tokio::task::spawn_blocking(move || ranker.rank(&past, candidates, &weights))
            .await
            .map_err(|e| RecommendError::Task(e.to_string()))??;

        info!(
            "Content-based: {} recommendations in {:.2?}",
            ranked.len(),
            start_time.elapsed()
        );
        Ok(ranked)
    }

    /// Score the popularity shortlist by travel distance from the user
    ///
    /// Candidates whose distance lookup fails or times out are left out.
    #[instrument(skip(self))]
    pub async fn get_location_aware_recommendations(
        &self,
        user_id: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Vec<LocationRecommendation>, RecommendError> {
        let start_time = Instant::now();

        let origin = match (latitude, longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Coordinates::new(lat, lng)
            }
            _ => return Err(RecommendError::MissingLocation),
        };

        let popular = self.data_index.popular_attractions(self.config.popular_limit);
        debug!("Popularity shortlist: {} candidates", popular.len());

        let located = self.attach_distances(origin, popular).await;
        if located.is_empty() {
            warn!("No candidate has a usable distance");
            return Ok(Vec::new());
        }

        let scored = self.scorer.score(located, &self.config.composite_weights)?;
        let recommendations: Vec<LocationRecommendation> =
            scored.into_iter().map(LocationRecommendation::from).collect();

        info!(
            "Location-aware: {} recommendations in {:.2?}",
            recommendations.len(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Attractions clustered with the user's recent saves
    pub fn get_cluster_recommendations(&self, user_id: &str) -> Option<Vec<RecommendedItem>> {
        self.cluster.get_candidates(user_id)
    }

    /// Attractions saved by users sharing the user's preference signature
    pub fn get_peer_group_recommendations(&self, user_id: &str) -> Option<Vec<RecommendedItem>> {
        self.peers.get_candidates(user_id)
    }

    /// Most-saved attractions, for users with no signal at all
    pub fn get_most_saved_recommendations(&self) -> Vec<RecommendedItem> {
        self.most_saved
            .get_candidates(self.config.generator_sample_size)
    }

    /// Apply a like/unlike event to the user's peer group
    ///
    /// Returns the touched signature, or `None` if the user declared no
    /// preferences.
    #[instrument(skip(self))]
    pub fn record_save_change(
        &self,
        user_id: &str,
        attraction_id: &str,
        liked: bool,
    ) -> Result<Option<PreferenceSignature>, RecommendError> {
        if self.data_index.get_attraction(attraction_id).is_none() {
            return Err(RecommendError::UnknownAttraction(attraction_id.to_string()));
        }
        Ok(sources::record_save_change(
            self.peer_groups.as_ref(),
            &self.data_index,
            user_id,
            attraction_id,
            liked,
        ))
    }

    /// Look up travel estimates for every candidate concurrently
    ///
    /// Keeps the input order and drops candidates without a usable distance.
    async fn attach_distances(
        &self,
        origin: Coordinates,
        candidates: Vec<FeatureVector>,
    ) -> Vec<FeatureVector> {
        let timeout = self.config.gateway_timeout();

        let lookups: Vec<(AttractionId, Result<TravelEstimate, GatewayError>)> =
            stream::iter(
                candidates
                    .iter()
                    .map(|c| {
                        (
                            c.attraction_id.clone(),
                            Coordinates::new(c.latitude, c.longitude),
                        )
                    })
                    .collect::<Vec<_>>(),
            )
            .map(|(attraction_id, destination)| {
                let gateway = self.gateway.clone();
                async move {
                    let outcome =
                        match tokio::time::timeout(timeout, gateway.travel(origin, destination))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(GatewayError::Timeout(timeout)),
                        };
                    (attraction_id, outcome)
                }
            })
            .buffer_unordered(self.config.distance_concurrency.max(1))
            .collect()
            .await;

        let mut estimates: HashMap<AttractionId, TravelEstimate> = HashMap::new();
        for (attraction_id, outcome) in lookups {
            match outcome {
                Ok(estimate) => match parse_distance(&estimate.distance) {
                    Ok(_) => {
                        estimates.insert(attraction_id, estimate);
                    }
                    Err(e) => warn!("Dropping {}: {}", attraction_id, e),
                },
                Err(e) => warn!("Dropping {}: {}", attraction_id, e),
            }
        }

        candidates
            .into_iter()
            .filter_map(|mut candidate| {
                let estimate = estimates.remove(&candidate.attraction_id)?;
                candidate.distance = Some(estimate.distance);
                candidate.duration = Some(estimate.duration);
                Some(candidate)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use data_loader::{Attraction, Category, Review, UserAccount};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// (id, latitude, longitude, save_count)
    const ATTRACTIONS: [(&str, f64, f64, u32); 6] = [
        ("a1", -33.85, 151.21, 12),
        ("a2", -33.86, 151.22, 7),
        ("a3", -33.87, 151.23, 3),
        ("a4", -33.88, 151.24, 9),
        ("a5", -33.89, 151.25, 0),
        ("a6", -33.90, 151.26, 4),
    ];

    fn coordinates_of(id: &str) -> Coordinates {
        ATTRACTIONS
            .iter()
            .find(|(aid, ..)| *aid == id)
            .map(|&(_, lat, lng, _)| Coordinates::new(lat, lng))
            .unwrap()
    }

    fn review(attraction_id: &str, user_id: &str, green: f64, like: f64) -> Review {
        Review {
            attraction_id: attraction_id.to_string(),
            user_id: user_id.to_string(),
            green_score: green,
            like_score: like,
        }
    }

    fn build_test_data_index() -> Arc<DataIndex> {
        let mut index = DataIndex::new();
        for (id, lat, lng, saves) in ATTRACTIONS {
            index.insert_attraction(Attraction {
                id: id.to_string(),
                title: format!("Attraction {}", id),
                city: Some("Sydney".to_string()),
                image_url: Some(format!("https://img.example/{}.jpg", id)),
                latitude: lat,
                longitude: lng,
                save_count: saves,
            });
        }

        for r in [
            review("a1", "two", 4.0, 4.0),
            review("a2", "two", 3.0, 5.0),
            review("a1", "three", 5.0, 4.0),
            review("a2", "three", 2.0, 3.0),
            review("a3", "three", 4.5, 4.5),
            review("a1", "other", 3.0, 3.0),
            review("a4", "other", 4.0, 2.0),
            review("a5", "other", 1.0, 1.0),
            review("a6", "other", 3.5, 4.0),
        ] {
            index.insert_review(r);
        }
        index.compute_attraction_stats();

        index.insert_user(UserAccount {
            id: "saver".to_string(),
            username: None,
            saved: vec!["a1".to_string(), "a2".to_string()],
        });
        index.insert_user(UserAccount {
            id: "fresh".to_string(),
            username: None,
            saved: vec![],
        });
        index.insert_cluster(vec!["a1".into(), "a3".into(), "a4".into()]);
        index.insert_cluster(vec!["a2".into(), "a5".into()]);

        index.insert_preferences("hiker".into(), vec![Category::Hiking]);
        index.insert_preferences("museum".into(), vec![Category::Museum]);
        index.insert_peer_group(
            PreferenceSignature::from_categories(&[Category::Hiking]),
            vec!["a5".into(), "a6".into()],
        );

        Arc::new(index)
    }

    // ============================================================================
    // Mock Distance Gateway
    // ============================================================================

    #[derive(Clone, Copy)]
    enum Scripted {
        Distance(&'static str),
        Fail,
        Hang,
    }

    /// Answers by destination, so completion order never matters
    struct ScriptedGateway {
        script: HashMap<String, Scripted>,
    }

    impl ScriptedGateway {
        fn new(entries: &[(&str, Scripted)]) -> Arc<Self> {
            let script = entries
                .iter()
                .map(|&(id, outcome)| (coordinates_of(id).to_string(), outcome))
                .collect();
            Arc::new(Self { script })
        }
    }

    #[async_trait]
    impl DistanceGateway for ScriptedGateway {
        async fn travel(
            &self,
            _origin: Coordinates,
            destination: Coordinates,
        ) -> Result<TravelEstimate, GatewayError> {
            match self.script.get(&destination.to_string()).copied() {
                Some(Scripted::Distance(distance)) => Ok(TravelEstimate {
                    distance: distance.to_string(),
                    duration: "12 mins".to_string(),
                }),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(GatewayError::Request("unreachable".into()))
                }
                Some(Scripted::Fail) | None => Err(GatewayError::NoRoute {
                    status: "ZERO_RESULTS".into(),
                }),
            }
        }
    }

    fn all_reachable() -> Arc<ScriptedGateway> {
        ScriptedGateway::new(&[
            ("a1", Scripted::Distance("4.2 km")),
            ("a2", Scripted::Distance("1 km")),
            ("a3", Scripted::Distance("12 km")),
            ("a4", Scripted::Distance("7.5 km")),
            ("a5", Scripted::Distance("1,020 km")),
            ("a6", Scripted::Distance("3 km")),
        ])
    }

    fn build_test_orchestrator(gateway: Arc<dyn DistanceGateway>) -> RecommendationOrchestrator {
        let data_index = build_test_data_index();
        let store = Arc::new(InMemoryPeerGroups::from_index(&data_index));
        RecommendationOrchestrator::with_components(
            data_index,
            gateway,
            store,
            Arc::new(RandomSampler::seeded(7)),
            RecommenderConfig::default(),
        )
    }

    // ============================================================================
    // Content-based
    // ============================================================================

    #[tokio::test]
    async fn test_two_reviews_is_insufficient_history() {
        let orchestrator = build_test_orchestrator(all_reachable());
        let err = orchestrator
            .get_content_based_recommendations("two")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendError::InsufficientHistory { found: 2, required: 3 }
        ));
    }

    #[tokio::test]
    async fn test_content_based_excludes_reviewed() {
        let orchestrator = build_test_orchestrator(all_reachable());
        let ranked = orchestrator
            .get_content_based_recommendations("three")
            .await
            .unwrap();

        let ids: Vec<_> = ranked.iter().map(|r| r.attraction.attraction_id.as_str()).collect();
        assert_eq!(ranked.len(), 3);
        assert!(ids.iter().all(|id| !["a1", "a2", "a3"].contains(id)));
        for pair in ranked.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    // ============================================================================
    // Location-aware
    // ============================================================================

    #[tokio::test]
    async fn test_missing_location() {
        let orchestrator = build_test_orchestrator(all_reachable());
        for (lat, lng) in [(None, Some(151.2)), (Some(-33.8), None), (Some(f64::NAN), Some(151.2))] {
            let err = orchestrator
                .get_location_aware_recommendations("anyone", lat, lng)
                .await
                .unwrap_err();
            assert!(matches!(err, RecommendError::MissingLocation));
        }
    }

    #[tokio::test]
    async fn test_location_aware_ranks_shortlist() {
        let orchestrator = build_test_orchestrator(all_reachable());
        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();

        // a5 has the lowest popularity and misses the shortlist
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.id != "a5"));
        for pair in results.windows(2) {
            assert!(pair[0].composite_score >= pair[1].composite_score);
        }
        assert!(results.iter().all(|r| r.duration == "12 mins"));
    }

    #[tokio::test]
    async fn test_failed_lookup_drops_candidate() {
        let gateway = ScriptedGateway::new(&[
            ("a1", Scripted::Distance("4.2 km")),
            ("a2", Scripted::Fail),
            ("a3", Scripted::Distance("not a distance")),
            ("a4", Scripted::Distance("7.5 km")),
            ("a5", Scripted::Distance("2 km")),
            ("a6", Scripted::Distance("3 km")),
        ]);
        let orchestrator = build_test_orchestrator(gateway);
        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(results.len(), 3);
        assert!(!ids.contains(&"a2"));
        assert!(!ids.contains(&"a3"));
    }

    #[tokio::test]
    async fn test_timed_out_lookup_drops_candidate() {
        let gateway = ScriptedGateway::new(&[
            ("a1", Scripted::Hang),
            ("a2", Scripted::Distance("1 km")),
            ("a3", Scripted::Distance("12 km")),
            ("a4", Scripted::Distance("7.5 km")),
            ("a5", Scripted::Distance("2 km")),
            ("a6", Scripted::Distance("3 km")),
        ]);
        let data_index = build_test_data_index();
        let orchestrator = RecommendationOrchestrator::new(
            data_index,
            gateway,
            RecommenderConfig::default().with_gateway_timeout(Duration::from_millis(50)),
        );

        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.id != "a1"));
    }

    #[tokio::test]
    async fn test_all_lookups_failing_gives_empty() {
        let orchestrator = build_test_orchestrator(ScriptedGateway::new(&[]));
        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_nearest_wins_when_popularity_ties() {
        let mut index = DataIndex::new();
        for (id, lat, lng, _) in ATTRACTIONS.iter().take(3) {
            index.insert_attraction(Attraction {
                id: id.to_string(),
                title: id.to_string(),
                city: None,
                image_url: None,
                latitude: *lat,
                longitude: *lng,
                save_count: 1,
            });
            index.insert_review(review(id, "u", 4.0, 4.0));
        }
        index.compute_attraction_stats();

        let gateway = ScriptedGateway::new(&[
            ("a1", Scripted::Distance("10 km")),
            ("a2", Scripted::Distance("1 km")),
            ("a3", Scripted::Distance("5 km")),
        ]);
        let orchestrator =
            RecommendationOrchestrator::new(Arc::new(index), gateway, RecommenderConfig::default());
        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();

        assert_eq!(results[0].id, "a2");
        assert!((results[0].composite_score - 0.20).abs() < 1e-12);
        assert_eq!(results[2].id, "a1");
    }

    /// Answers after a per-destination delay and tracks peak concurrency
    struct DelayedGateway {
        script: HashMap<String, (String, u64)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DistanceGateway for DelayedGateway {
        async fn travel(
            &self,
            _origin: Coordinates,
            destination: Coordinates,
        ) -> Result<TravelEstimate, GatewayError> {
            let (distance, delay_ms) = self
                .script
                .get(&destination.to_string())
                .cloned()
                .ok_or_else(|| GatewayError::NoRoute {
                    status: "NOT_FOUND".into(),
                })?;

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(TravelEstimate {
                distance,
                duration: format!("{} mins", delay_ms),
            })
        }
    }

    #[tokio::test]
    async fn test_fan_out_is_bounded_and_keyed_by_attraction() {
        // b0 is the most popular and answers last
        let mut index = DataIndex::new();
        let mut script = HashMap::new();
        for i in 0..8u64 {
            let id = format!("b{}", i);
            let (lat, lng) = (-33.80 - i as f64 * 0.01, 151.20);
            index.insert_attraction(Attraction {
                id: id.clone(),
                title: id.clone(),
                city: None,
                image_url: None,
                latitude: lat,
                longitude: lng,
                save_count: 0,
            });
            for reviewer in 0..(8 - i) {
                index.insert_review(review(&id, &format!("u{}", reviewer), 3.0, 3.0));
            }
            script.insert(
                Coordinates::new(lat, lng).to_string(),
                (format!("{} km", i + 1), 200 - 20 * i),
            );
        }
        index.compute_attraction_stats();

        let gateway = Arc::new(DelayedGateway {
            script,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let orchestrator = RecommendationOrchestrator::new(
            Arc::new(index),
            gateway.clone(),
            RecommenderConfig::default().with_popular_limit(8),
        );

        let results = orchestrator
            .get_location_aware_recommendations("anyone", Some(-33.86), Some(151.2))
            .await
            .unwrap();

        assert_eq!(results.len(), 8);
        for rec in &results {
            let i: u64 = rec.id[1..].parse().unwrap();
            assert_eq!(rec.distance, format!("{} km", i + 1));
            assert_eq!(rec.duration, format!("{} mins", 200 - 20 * i));
        }
        assert_eq!(gateway.peak.load(Ordering::SeqCst), 5);
        assert_eq!(gateway.in_flight.load(Ordering::SeqCst), 0);
    }

    // ============================================================================
    // Generators
    // ============================================================================

    #[test]
    fn test_cluster_recommendations() {
        let orchestrator = build_test_orchestrator(all_reachable());
        assert!(orchestrator.get_cluster_recommendations("fresh").is_none());
        assert!(orchestrator.get_cluster_recommendations("nobody").is_none());

        let items = orchestrator.get_cluster_recommendations("saver").unwrap();
        // Pool is a1, a3, a4, a2, a5: exactly five, so nothing is sampled away
        let mut ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a1", "a2", "a3", "a4", "a5"]);
    }

    #[test]
    fn test_peer_group_recommendations() {
        let orchestrator = build_test_orchestrator(all_reachable());
        assert!(orchestrator.get_peer_group_recommendations("museum").is_none());
        assert!(orchestrator.get_peer_group_recommendations("nobody").is_none());

        let items = orchestrator.get_peer_group_recommendations("hiker").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_seeded_generators_are_deterministic() {
        let a = build_test_orchestrator(all_reachable());
        let b = build_test_orchestrator(all_reachable());
        assert_eq!(
            a.get_peer_group_recommendations("hiker"),
            b.get_peer_group_recommendations("hiker")
        );
        assert_eq!(
            a.get_cluster_recommendations("saver"),
            b.get_cluster_recommendations("saver")
        );
    }

    #[test]
    fn test_save_change_feeds_peer_group() {
        let orchestrator = build_test_orchestrator(all_reachable());

        let touched = orchestrator.record_save_change("museum", "a3", true).unwrap();
        assert_eq!(
            touched,
            Some(PreferenceSignature::from_categories(&[Category::Museum]))
        );
        let items = orchestrator.get_peer_group_recommendations("museum").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a3");

        orchestrator.record_save_change("museum", "a3", false).unwrap();
        assert!(orchestrator.get_peer_group_recommendations("museum").is_none());
    }

    #[test]
    fn test_save_change_unknown_attraction() {
        let orchestrator = build_test_orchestrator(all_reachable());
        assert!(matches!(
            orchestrator.record_save_change("museum", "ghost", true),
            Err(RecommendError::UnknownAttraction(_))
        ));
    }

    #[test]
    fn test_most_saved() {
        let orchestrator = build_test_orchestrator(all_reachable());
        let ids: Vec<_> = orchestrator
            .get_most_saved_recommendations()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["a1", "a4", "a2", "a6", "a3"]);
    }
}
