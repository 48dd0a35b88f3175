//! Server crate for the attraction recommendation engine.
//!
//! This crate contains the orchestrator that exposes the recommendation
//! entry points, plus the configuration they run under.

pub mod config;
pub mod orchestrator;

pub use config::{ConfigError, RecommenderConfig};
pub use orchestrator::{LocationRecommendation, RecommendError, RecommendationOrchestrator};
