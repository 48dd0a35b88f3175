//! # Data Loader Crate
//!
//! This crate loads and indexes the attraction dataset exported from the
//! document store: attraction metadata, user reviews, saved lists, declared
//! preferences, and the two offline lookups (similarity clusters and
//! preference-signature peer groups).
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Attraction, Review, FeatureVector, DataIndex)
//! - **parser**: Parse the JSON exports into strict Rust structs
//! - **index**: Build indices and answer stats/popularity queries
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_dir(Path::new("data/sample"))?;
//!
//! let past = index.reviewed_by("64a1f0c2e4b0a1b2c3d4e5f6");
//! let popular = index.popular_attractions(5);
//!
//! println!("{} reviewed, {} popular", past.len(), popular.len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    AttractionId,
    UserId,
    // Core types
    Attraction,
    AttractionStats,
    DataIndex,
    FeatureVector,
    Review,
    UserAccount,
    // Lookups
    Category,
    ClusterMembership,
    PreferenceSignature,
};
