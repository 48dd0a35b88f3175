use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId};
use geo_client::{DistanceGateway, DistanceMatrixClient, HaversineGateway};
use rand::seq::IndexedRandom;
use ranking::{SURVEY_LIST_SIZE, evaluate, parse_survey};
use server::{LocationRecommendation, RecommendError, RecommendationOrchestrator, RecommenderConfig};
use sources::RecommendedItem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Attraction recommendation engine
#[derive(Parser)]
#[command(name = "attraction-recs")]
#[command(about = "Tourist attraction recommendations from reviews, saves and location", long_about = None)]
struct Cli {
    /// Path to the attraction dataset directory
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    /// JSON file overriding the default recommender configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Estimate travel distances locally instead of calling the Distance Matrix API
    #[arg(long)]
    offline: bool,

    /// Distance Matrix API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank unreviewed attractions against a user's reviews
    ContentBased {
        #[arg(long)]
        user_id: UserId,
    },

    /// Score popular attractions by travel distance from a location
    Nearby {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Sample attractions clustered with a user's recent saves
    Cluster {
        #[arg(long)]
        user_id: UserId,
    },

    /// Sample attractions saved by users with the same preferences
    PeerGroup {
        #[arg(long)]
        user_id: UserId,
    },

    /// Show the most-saved attractions
    MostSaved,

    /// Apply a like or unlike, then show the user's peer-group sample
    Save {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        attraction_id: String,

        /// Record an unlike instead of a like
        #[arg(long)]
        unlike: bool,
    },

    /// Compute precision, recall and F1 from survey responses
    Evaluate {
        /// Survey file (JSON array of responses)
        #[arg(long, default_value = "data/sample/survey.json")]
        survey: PathBuf,

        /// Number of recommendations each participant was shown
        #[arg(long, default_value_t = SURVEY_LIST_SIZE)]
        list_size: usize,
    },

    /// Show a user's saves, reviews and declared preferences
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Fire location-aware requests for random users and report latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Survey evaluation needs no dataset
    if let Commands::Evaluate { survey, list_size } = &cli.command {
        return handle_evaluate(survey, *list_size, cli.json);
    }

    let config = match &cli.config {
        Some(path) => RecommenderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RecommenderConfig::default(),
    };

    println!("Loading attraction dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_dir(&cli.data_dir).context("Failed to load attraction dataset")?,
    );
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    let gateway = build_gateway(cli.offline, cli.api_key.clone(), &config);
    let orchestrator = RecommendationOrchestrator::new(data_index.clone(), gateway, config);

    match cli.command {
        Commands::ContentBased { user_id } => {
            handle_content_based(&orchestrator, &user_id, cli.json).await?
        }
        Commands::Nearby { user_id, lat, lng } => {
            handle_nearby(&orchestrator, &user_id, lat, lng, cli.json).await?
        }
        Commands::Cluster { user_id } => {
            let items = orchestrator.get_cluster_recommendations(&user_id);
            print_items("Cluster recommendations", items.as_deref(), cli.json)?;
        }
        Commands::PeerGroup { user_id } => {
            let items = orchestrator.get_peer_group_recommendations(&user_id);
            print_items("Peer-group recommendations", items.as_deref(), cli.json)?;
        }
        Commands::MostSaved => {
            let items = orchestrator.get_most_saved_recommendations();
            print_items("Most saved", Some(&items), cli.json)?;
        }
        Commands::Save {
            user_id,
            attraction_id,
            unlike,
        } => handle_save(&orchestrator, &user_id, &attraction_id, !unlike, cli.json)?,
        Commands::User { user_id } => handle_user(&data_index, &user_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
        // Handled before the dataset loads
        Commands::Evaluate { .. } => {}
    }

    Ok(())
}

fn build_gateway(
    offline: bool,
    api_key: Option<String>,
    config: &RecommenderConfig,
) -> Arc<dyn DistanceGateway> {
    match api_key {
        Some(key) if !offline => {
            Arc::new(DistanceMatrixClient::new(key).with_timeout(config.gateway_timeout()))
        }
        _ => {
            if !offline {
                println!(
                    "{} No API key; estimating straight-line distances",
                    "!".yellow()
                );
            }
            Arc::new(HaversineGateway::new())
        }
    }
}

/// Handle the 'content-based' command
async fn handle_content_based(
    orchestrator: &RecommendationOrchestrator,
    user_id: &str,
    json: bool,
) -> Result<()> {
    let ranked = match orchestrator.get_content_based_recommendations(user_id).await {
        Ok(ranked) => ranked,
        Err(RecommendError::InsufficientHistory { found, required }) => {
            println!(
                "{} User {} has {} reviews; at least {} are needed",
                "✗".red(),
                user_id,
                found,
                required
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    println!("{}", "Content-based recommendations:".bold().blue());
    for (i, rec) in ranked.iter().enumerate() {
        let a = &rec.attraction;
        println!(
            "{}. {} ({}) - Similarity: {:.3}",
            (i + 1).to_string().green(),
            a.title,
            a.city.as_deref().unwrap_or("?"),
            rec.similarity
        );
        println!(
            "   {} reviews, green {:.2}, like {:.2}, {} saves",
            a.review_count, a.avg_green_score, a.avg_like_score, a.save_count
        );
    }
    Ok(())
}

/// Handle the 'nearby' command
async fn handle_nearby(
    orchestrator: &RecommendationOrchestrator,
    user_id: &str,
    lat: Option<f64>,
    lng: Option<f64>,
    json: bool,
) -> Result<()> {
    let results = orchestrator
        .get_location_aware_recommendations(user_id, lat, lng)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    print_location_recommendations(&results);
    Ok(())
}

/// Handle the 'save' command
fn handle_save(
    orchestrator: &RecommendationOrchestrator,
    user_id: &str,
    attraction_id: &str,
    liked: bool,
    json: bool,
) -> Result<()> {
    match orchestrator.record_save_change(user_id, attraction_id, liked)? {
        Some(signature) => println!(
            "{} {} {} in peer group {}",
            "✓".green(),
            if liked { "Added" } else { "Removed" },
            attraction_id,
            signature
        ),
        None => println!(
            "{} User {} has no declared preferences; no peer group changed",
            "!".yellow(),
            user_id
        ),
    }

    let items = orchestrator.get_peer_group_recommendations(user_id);
    print_items("Peer-group recommendations", items.as_deref(), json)
}

/// Handle the 'evaluate' command
fn handle_evaluate(path: &Path, list_size: usize, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read survey {}", path.display()))?;
    let records: serde_json::Value = serde_json::from_str(&raw).context("Survey is not JSON")?;
    let responses = parse_survey(&records)?;
    let summary = evaluate(&responses, list_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Survey evaluation:".bold().blue());
    println!("{}Responses: {}", "• ".green(), summary.responses);
    println!("{}Average precision: {:.4}", "• ".green(), summary.average_precision);
    println!("{}Average recall: {:.4}", "• ".green(), summary.average_recall);
    println!("{}F1 score: {:.4}", "• ".cyan(), summary.f1_score);
    Ok(())
}

/// Handle the 'user' command
fn handle_user(data_index: &DataIndex, user_id: &str) -> Result<()> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    println!("{}", format!("User: {}", user_id).bold().blue());
    if let Some(name) = &user.username {
        println!("{}Username: {}", "• ".green(), name);
    }

    match data_index.get_preferences(user_id) {
        Some(categories) if !categories.is_empty() => {
            let names: Vec<_> = categories.iter().map(|c| c.name()).collect();
            println!("{}Preferences: {}", "• ".green(), names.join(", "));
        }
        _ => println!("{}Preferences: none declared", "• ".green()),
    }

    let reviews = data_index.get_user_reviews(user_id);
    println!("{}Reviews: {}", "• ".cyan(), reviews.len());
    for review in reviews {
        let title = data_index
            .get_attraction(&review.attraction_id)
            .map(|a| a.title.as_str())
            .unwrap_or("<unknown>");
        println!(
            "  - {} (green {:.1}, like {:.1})",
            title, review.green_score, review.like_score
        );
    }

    println!("{}Saved: {}", "• ".cyan(), user.saved.len());
    for id in &user.saved {
        if let Some(attraction) = data_index.get_attraction(id) {
            println!("  - {}", attraction.title);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let user_ids: Vec<UserId> = orchestrator
        .data_index()
        .all_users()
        .map(|u| u.id.clone())
        .collect();
    if user_ids.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark"));
    }

    let mut rng = rand::rng();
    let picks: Vec<UserId> = (0..requests)
        .filter_map(|_| user_ids.choose(&mut rng).cloned())
        .collect();

    let (lat, lng) = (-37.8136, 144.9631);
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();

    let mut handles = Vec::with_capacity(picks.len());
    for user in picks {
        let orchestrator = orchestrator.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            orchestrator
                .get_location_aware_recommendations(&user, Some(lat), Some(lng))
                .await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall.elapsed();

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / total_time.as_secs_f64()
    );
    Ok(())
}

fn print_location_recommendations(recommendations: &[LocationRecommendation]) {
    println!("{}", "Nearby recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (no candidate had a usable distance)");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) - {} / {} - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            rec.city.as_deref().unwrap_or("?"),
            rec.distance,
            rec.duration,
            rec.composite_score
        );
    }
}

/// Print generator output; `None` means the strategy had nothing to go on
fn print_items(header: &str, items: Option<&[RecommendedItem]>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("{}", format!("{}:", header).bold().blue());
    match items {
        None => println!("  (no recommendations for this user)"),
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                println!(
                    "{}. {} ({}) [{}]",
                    (i + 1).to_string().green(),
                    item.title,
                    item.city.as_deref().unwrap_or("?"),
                    item.id
                );
            }
        }
    }
    Ok(())
}
