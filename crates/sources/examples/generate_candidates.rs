//! Example: Generate candidates for a user
//!
//! Run with: cargo run --package sources --example generate_candidates -- <user_id>
//!
//! This example shows how to:
//! 1. Load the attraction dataset
//! 2. Generate cluster candidates from recent saves
//! 3. Generate peer-group candidates from declared preferences
//! 4. Display the results

use data_loader::DataIndex;
use sources::{
    ClusterSource, InMemoryPeerGroups, MostSavedSource, PeerGroupSource, RandomSampler,
    RecommendedItem,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn print_items(label: &str, items: Option<Vec<RecommendedItem>>) {
    match items {
        None => println!("{}: no signal for this user", label),
        Some(items) if items.is_empty() => println!("{}: nothing matched", label),
        Some(items) => {
            println!("{} ({}):", label, items.len());
            for item in items {
                println!(
                    "  {} - {} ({})",
                    item.id,
                    item.title,
                    item.city.as_deref().unwrap_or("unknown city")
                );
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let user_id = std::env::args().nth(1).unwrap_or_default();

    println!("=== Attraction Candidate Generation Example ===\n");

    let start = Instant::now();
    let data_index = Arc::new(DataIndex::load_from_dir(Path::new("data/sample"))?);
    println!("Loaded in {:?}\n", start.elapsed());

    let sampler = Arc::new(RandomSampler::from_entropy());
    let store = Arc::new(InMemoryPeerGroups::from_index(&data_index));

    let cluster = ClusterSource::new(data_index.clone(), sampler.clone());
    let peers = PeerGroupSource::new(data_index.clone(), store, sampler);

    let start = Instant::now();
    print_items("Cluster", cluster.get_candidates(&user_id));
    print_items("Peer group", peers.get_candidates(&user_id));
    print_items(
        "Most saved",
        Some(MostSavedSource::new(data_index).get_candidates(5)),
    );
    println!("\nGenerated in {:?}", start.elapsed());

    Ok(())
}
