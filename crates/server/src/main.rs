//! Simple test harness for the recommendation orchestrator.
//!
//! Runs every strategy once for a single user against a dataset directory.
//!
//! Environment:
//! - `ATTRACTION_DATA_DIR`: dataset directory (default `data/sample`)
//! - `RECOMMENDER_CONFIG`: optional JSON config file
//! - `GOOGLE_API_KEY`: use the Distance Matrix API instead of the offline estimate
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::DataIndex;
use geo_client::{DistanceGateway, DistanceMatrixClient, HaversineGateway};
use server::{RecommendationOrchestrator, RecommenderConfig};

/// Melbourne CBD, used when no location is given
const DEFAULT_LOCATION: (f64, f64) = (-37.8136, 144.9631);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting attraction recommender test harness");

    let data_dir = env::var("ATTRACTION_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/sample"));
    let data_index = Arc::new(
        DataIndex::load_from_dir(&data_dir)
            .with_context(|| format!("failed to load dataset from {}", data_dir.display()))?,
    );

    let config = match env::var("RECOMMENDER_CONFIG") {
        Ok(path) => RecommenderConfig::from_file(Path::new(&path))?,
        Err(_) => RecommenderConfig::default(),
    };

    let gateway: Arc<dyn DistanceGateway> = match env::var("GOOGLE_API_KEY") {
        Ok(key) => {
            info!("Using Distance Matrix API");
            Arc::new(DistanceMatrixClient::new(key).with_timeout(config.gateway_timeout()))
        }
        Err(_) => {
            info!("GOOGLE_API_KEY not set, using straight-line estimates");
            Arc::new(HaversineGateway::new())
        }
    };

    let orchestrator = RecommendationOrchestrator::new(data_index.clone(), gateway, config);

    let user_id = match env::args().nth(1) {
        Some(id) => id,
        None => data_index
            .all_users()
            .map(|u| u.id.clone())
            .min()
            .context("dataset has no users")?,
    };
    info!("Getting recommendations for user {}", user_id);

    match orchestrator.get_content_based_recommendations(&user_id).await {
        Ok(ranked) => {
            info!("Content-based: {} recommendations", ranked.len());
            for (i, rec) in ranked.iter().enumerate() {
                info!(
                    "{}. {} - Similarity: {:.3}",
                    i + 1,
                    rec.attraction.title,
                    rec.similarity
                );
            }
        }
        Err(e) => warn!("Content-based unavailable: {}", e),
    }

    let (lat, lng) = DEFAULT_LOCATION;
    let nearby = orchestrator
        .get_location_aware_recommendations(&user_id, Some(lat), Some(lng))
        .await?;
    info!("Location-aware: {} recommendations", nearby.len());
    for (i, rec) in nearby.iter().enumerate() {
        info!(
            "{}. {} ({}, {}) - Score: {:.3}",
            i + 1,
            rec.title,
            rec.distance,
            rec.duration,
            rec.composite_score
        );
    }

    let cluster = orchestrator.get_cluster_recommendations(&user_id);
    info!("Cluster: {}", serde_json::to_string(&cluster)?);
    let peers = orchestrator.get_peer_group_recommendations(&user_id);
    info!("Peer group: {}", serde_json::to_string(&peers)?);
    let most_saved = orchestrator.get_most_saved_recommendations();
    info!("Most saved: {}", serde_json::to_string(&most_saved)?);

    Ok(())
}
