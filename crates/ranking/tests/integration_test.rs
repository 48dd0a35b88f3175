//! Integration tests for ranking.
//!
//! These tests build a small DataIndex, pull feature vectors from it the way
//! the orchestrator does, and run both rankers end to end.

use data_loader::{Attraction, DataIndex, Review};
use ranking::{CompositeScorer, ContentRanker, RankingError, UserProfile, WeightSet};

fn create_test_index() -> DataIndex {
    let mut index = DataIndex::new();

    let places = [
        ("a1", "Royal Botanic Garden", -33.864, 151.216, 12),
        ("a2", "Taronga Zoo", -33.843, 151.241, 8),
        ("a3", "Bondi to Coogee Walk", -33.891, 151.277, 20),
        ("a4", "Blue Mountains Lookout", -33.732, 150.311, 3),
        ("a5", "Art Gallery", -33.868, 151.217, 0),
        ("a6", "Featherdale Wildlife Park", -33.771, 150.873, 5),
    ];
    for (id, title, lat, lng, saves) in places {
        index.insert_attraction(Attraction {
            id: id.to_string(),
            title: title.to_string(),
            city: Some("Sydney".to_string()),
            image_url: Some(format!("https://img.example/{}.jpg", id)),
            latitude: lat,
            longitude: lng,
            save_count: saves,
        });
    }

    // (attraction, user, green, like)
    let reviews = [
        ("a1", "alice", 5.0, 4.5),
        ("a2", "alice", 4.0, 4.0),
        ("a3", "alice", 4.5, 5.0),
        ("a1", "bob", 4.0, 4.0),
        ("a4", "bob", 3.0, 2.0),
        ("a5", "carol", 2.0, 3.5),
        ("a6", "carol", 4.5, 4.0),
        ("a6", "dave", 4.0, 3.0),
        ("a3", "dave", 5.0, 4.0),
    ];
    for (attraction_id, user_id, green, like) in reviews {
        index.insert_review(Review {
            attraction_id: attraction_id.to_string(),
            user_id: user_id.to_string(),
            green_score: green,
            like_score: like,
        });
    }

    index.compute_attraction_stats();
    index.validate().unwrap();
    index
}

#[test]
fn test_content_ranking_excludes_reviewed() {
    let index = create_test_index();
    let past = index.reviewed_by("alice");
    let candidates = index.not_reviewed_by("alice");
    assert_eq!(past.len(), 3);

    let ranked = ContentRanker::new()
        .rank(&past, candidates, &WeightSet::content_based())
        .unwrap();

    assert_eq!(ranked.len(), 3);
    for item in &ranked {
        assert!(!["a1", "a2", "a3"].contains(&item.attraction.attraction_id.as_str()));
    }
    for pair in ranked.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn test_content_ranking_respects_limit() {
    let index = create_test_index();
    let past = index.reviewed_by("alice");
    let ranked = ContentRanker::new()
        .with_limit(2)
        .rank(&past, index.not_reviewed_by("alice"), &WeightSet::content_based())
        .unwrap();
    assert_eq!(ranked.len(), 2);
}

#[test]
fn test_profile_requires_history() {
    let index = create_test_index();
    let past = index.reviewed_by("nobody");
    assert!(matches!(
        UserProfile::build(&past, &WeightSet::content_based()),
        Err(RankingError::EmptyHistory)
    ));
}

#[test]
fn test_popular_then_composite() {
    let index = create_test_index();
    let mut popular = index.popular_attractions(5);
    assert_eq!(popular.len(), 5);

    let distances = ["14 km", "2.5 km", "1 km", "30 km", "1,250 km"];
    for (candidate, distance) in popular.iter_mut().zip(distances) {
        candidate.distance = Some(distance.to_string());
        candidate.duration = Some("20 mins".to_string());
    }
    let nearest = popular[2].attraction_id.clone();

    let scored = CompositeScorer::new()
        .score(popular, &WeightSet::composite())
        .unwrap();

    assert_eq!(scored.len(), 5);
    for pair in scored.windows(2) {
        assert!(pair[0].composite_score >= pair[1].composite_score);
    }
    let near = scored
        .iter()
        .find(|s| s.attraction.attraction_id == nearest)
        .unwrap();
    assert_eq!(near.distance_norm, 1.0);
}
