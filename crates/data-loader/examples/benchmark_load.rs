use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let data_dir = Path::new("data/sample");

    println!("Loading attraction dataset...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_dir(data_dir).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (attractions, users, reviews) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Attractions: {}", attractions);
    println!("Users: {}", users);
    println!("Reviews: {}", reviews);
    println!("Clusters: {}", index.clusters().len());
    println!("Peer groups: {}", index.peer_groups().len());
    println!(
        "\nPerformance: {:.0} reviews/second",
        reviews as f64 / elapsed.as_secs_f64()
    );
}
