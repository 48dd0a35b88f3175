//! Recommender configuration.
//!
//! Every knob has a default matching production behaviour, so an empty JSON
//! object (or no file at all) is a valid configuration.

use ranking::WeightSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommenderConfig {
    /// Reviews required before content-based ranking is attempted
    pub min_history: usize,
    /// Maximum content-based results
    pub content_limit: usize,
    /// Popularity shortlist size for location-aware scoring
    pub popular_limit: usize,
    /// Distance lookups allowed in flight at once
    pub distance_concurrency: usize,
    pub gateway_timeout_ms: u64,
    /// Maximum items from the cluster, peer-group and most-saved generators
    pub generator_sample_size: usize,
    /// Recent saves that seed the cluster lookup
    pub recent_saves: usize,
    pub content_weights: WeightSet,
    pub composite_weights: WeightSet,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            min_history: 3,
            content_limit: 10,
            popular_limit: 5,
            distance_concurrency: 5,
            gateway_timeout_ms: 5_000,
            generator_sample_size: 5,
            recent_saves: 3,
            content_weights: WeightSet::content_based(),
            composite_weights: WeightSet::composite(),
        }
    }
}

impl RecommenderConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_history", self.min_history),
            ("content_limit", self.content_limit),
            ("distance_concurrency", self.distance_concurrency),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }
        if self.gateway_timeout_ms == 0 {
            return Err(ConfigError::Invalid("gateway_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_content_limit(mut self, limit: usize) -> Self {
        self.content_limit = limit;
        self
    }

    pub fn with_popular_limit(mut self, limit: usize) -> Self {
        self.popular_limit = limit;
        self
    }

    pub fn with_distance_concurrency(mut self, concurrency: usize) -> Self {
        self.distance_concurrency = concurrency;
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_generator_sample_size(mut self, size: usize) -> Self {
        self.generator_sample_size = size;
        self
    }

    pub fn with_recent_saves(mut self, count: usize) -> Self {
        self.recent_saves = count;
        self
    }

    pub fn with_content_weights(mut self, weights: WeightSet) -> Self {
        self.content_weights = weights;
        self
    }

    pub fn with_composite_weights(mut self, weights: WeightSet) -> Self {
        self.composite_weights = weights;
        self
    }
}
