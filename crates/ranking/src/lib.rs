//! Ranking of attraction candidates.
//!
//! This crate provides:
//! - Min-max normalization of feature columns
//! - UserProfile and cosine-similarity ContentRanker for review-based ranking
//! - CompositeScorer for location-aware weighted-sum ranking
//! - Survey-based offline evaluation
//!
//! ## Architecture
//! Rankers are pure, synchronous computations over `FeatureVector`s:
//! 1. Callers gather feature vectors from the DataIndex (and distances from
//!    the geo gateway)
//! 2. Every column is normalized over the set being ranked
//! 3. Scores are combined under a validated `WeightSet`
//!
//! ## Example Usage
//! ```ignore
//! use ranking::{ContentRanker, WeightSet};
//!
//! let past = index.reviewed_by(user_id);
//! let candidates = index.not_reviewed_by(user_id);
//!
//! let ranked = ContentRanker::new()
//!     .with_limit(10)
//!     .rank(&past, candidates, &WeightSet::content_based())?;
//! ```

pub mod composite;
pub mod error;
pub mod evaluation;
pub mod normalize;
pub mod profile;
pub mod similarity;
pub mod weights;

// Re-export main types
pub use composite::{CompositeScored, CompositeScorer, parse_distance};
pub use error::{RankingError, Result};
pub use evaluation::{
    EvaluationSummary, SURVEY_LIST_SIZE, SurveyResponse, evaluate, parse_survey,
};
pub use normalize::{normalize, normalize_column};
pub use profile::UserProfile;
pub use similarity::{ContentRanker, DEFAULT_CONTENT_LIMIT, RankedAttraction, cosine_similarity};
pub use weights::{Feature, WeightSet};
