//! Cluster Source - Similar-attraction lookup
//!
//! Generates candidates from the precomputed attraction clusters:
//! "Attractions grouped with what you saved recently"
//!
//! ## Algorithm
//! 1. Take the user's most recent saves (up to `recent_saves`, default 3)
//! 2. Collect every cluster group containing one of them
//! 3. Flatten the groups into one pool, duplicates kept
//! 4. Sample `sample_size` (default 5) from the pool when it is larger
//! 5. Resolve ids to display metadata

use crate::sampler::Sampler;
use crate::types::{RecommendedItem, resolve_items};
use data_loader::{AttractionId, DataIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ClusterSource {
    data_index: Arc<DataIndex>,
    sampler: Arc<dyn Sampler>,
    sample_size: usize,
    recent_saves: usize,
}

impl ClusterSource {
    pub fn new(data_index: Arc<DataIndex>, sampler: Arc<dyn Sampler>) -> Self {
        Self {
            data_index,
            sampler,
            sample_size: 5,
            recent_saves: 3,
        }
    }

    /// Configure the maximum number of items returned (default: 5)
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Configure how many recent saves seed the lookup (default: 3)
    pub fn with_recent_saves(mut self, count: usize) -> Self {
        self.recent_saves = count;
        self
    }

    /// Generate cluster candidates for a user
    ///
    /// `None` when the user is unknown or has saved nothing; an empty list
    /// when none of the recent saves belongs to a cluster.
    #[instrument(skip(self))]
    pub fn get_candidates(&self, user_id: &str) -> Option<Vec<RecommendedItem>> {
        let user = self.data_index.get_user(user_id)?;
        if user.saved.is_empty() {
            debug!("User has no saved attractions");
            return None;
        }

        let recent = &user.saved[user.saved.len().saturating_sub(self.recent_saves)..];
        let clusters = self.data_index.clusters();
        let pool: Vec<AttractionId> = recent
            .iter()
            .flat_map(|id| clusters.groups_containing(id))
            .flat_map(|group| group.iter().cloned())
            .collect();
        debug!("Pooled {} ids from {} recent saves", pool.len(), recent.len());

        let chosen = self.sampler.sample(pool, self.sample_size);
        Some(resolve_items(&self.data_index, &chosen))
    }
}
