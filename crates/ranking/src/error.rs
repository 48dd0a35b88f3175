//! Error types for the ranking crate.

use crate::weights::Feature;
use thiserror::Error;

/// Errors raised while validating or scoring feature vectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    /// Input was not an array of records, or a record lacked a numeric field
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A travel distance string had no leading number
    #[error("Could not parse distance from {raw:?}")]
    DistanceParse { raw: String },

    /// A profile was requested from zero past attractions
    #[error("Cannot build a profile from an empty history")]
    EmptyHistory,

    /// A weight was negative, NaN or infinite
    #[error("Invalid weight {weight} for feature {feature}")]
    InvalidWeight { feature: Feature, weight: f64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RankingError>;
