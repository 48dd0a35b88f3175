//! # Sources Crate
//!
//! This crate implements the candidate generators for attraction
//! recommendations. Each produces a short, randomly sampled list of display
//! items; none of them ranks.
//!
//! ## Components
//!
//! ### Cluster Source
//! Attractions grouped with what the user saved recently:
//! - Looks up the precomputed similarity clusters of the last 3 saves
//! - Samples at most 5 from the pooled members
//!
//! ### Peer Group Source
//! Attractions saved by users with the same declared preferences:
//! - Keys peer groups by a 13-bit `PreferenceSignature`
//! - Shuffles the group's saves and keeps 5
//! - `PeerGroupStore` is the mutable seam driven by like/unlike events
//!
//! ### Most-saved Source
//! Cold-start list ordered by save count.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{ClusterSource, InMemoryPeerGroups, PeerGroupSource, RandomSampler};
//! use std::sync::Arc;
//!
//! let data_index = Arc::new(DataIndex::load_from_dir(Path::new("data/sample"))?);
//! let sampler = Arc::new(RandomSampler::from_entropy());
//! let store = Arc::new(InMemoryPeerGroups::from_index(&data_index));
//!
//! let cluster = ClusterSource::new(data_index.clone(), sampler.clone());
//! let peers = PeerGroupSource::new(data_index.clone(), store, sampler);
//!
//! let similar = cluster.get_candidates(user_id);
//! let co_saved = peers.get_candidates(user_id);
//! ```

pub mod cluster;
pub mod peer_group;
pub mod popular;
pub mod sampler;
pub mod types;

// Re-export commonly used types
pub use cluster::ClusterSource;
pub use peer_group::{
    InMemoryPeerGroups, PeerGroupSource, PeerGroupStore, record_save_change, user_signature,
};
pub use popular::MostSavedSource;
pub use sampler::{RandomSampler, Sampler};
pub use types::{RecommendedItem, resolve_items};
