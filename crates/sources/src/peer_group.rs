//! Peer Group Source - Co-saves of users with identical preferences
//!
//! Users who declared exactly the same preference categories share a
//! `PreferenceSignature`. Every attraction saved by a member of that group is
//! a candidate for the others.
//!
//! ## Algorithm
//! 1. Build the user's signature from their declared categories
//! 2. Look the signature up in the `PeerGroupStore`
//! 3. Shuffle the group's saved attractions and keep `sample_size` (default 5)
//! 4. Resolve ids to display metadata
//!
//! The store is mutated by like/unlike events through `record_save_change`;
//! each mutation is one atomic upsert or removal.

use crate::sampler::Sampler;
use crate::types::{RecommendedItem, resolve_items};
use data_loader::{AttractionId, DataIndex, PreferenceSignature, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument};

/// Signature-keyed store of attractions saved by each peer group
pub trait PeerGroupStore: Send + Sync {
    /// Distinct saved ids of the group, in id order; `None` if no such group
    fn members(&self, signature: PreferenceSignature) -> Option<Vec<AttractionId>>;

    /// Record `user_id` saving an attraction, creating the group if absent.
    ///
    /// Returns false if that user's save was already recorded.
    fn add_member(&self, signature: PreferenceSignature, attraction_id: &str, user_id: &str) -> bool;

    /// Withdraw `user_id`'s save, deleting the group once nothing is left.
    ///
    /// Returns false if the group held no save by that user.
    fn remove_member(
        &self,
        signature: PreferenceSignature,
        attraction_id: &str,
        user_id: &str,
    ) -> bool;
}

/// Who saves one attraction within a group
#[derive(Debug, Default)]
struct Savers {
    /// Persisted saves not matched to any member's account
    unattributed: u32,
    users: BTreeSet<UserId>,
}

impl Savers {
    fn is_empty(&self) -> bool {
        self.unattributed == 0 && self.users.is_empty()
    }
}

/// In-process `PeerGroupStore`.
///
/// Saves are tracked per user, so an unlike only withdraws the caller's own
/// save and never one held by another member.
#[derive(Debug, Default)]
pub struct InMemoryPeerGroups {
    groups: RwLock<BTreeMap<PreferenceSignature, BTreeMap<AttractionId, Savers>>>,
}

impl InMemoryPeerGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with the peer groups loaded from disk.
    ///
    /// A persisted save is attributed to a member whose account lists it;
    /// the rest stay unattributed and no unlike event can withdraw them.
    pub fn from_index(data_index: &DataIndex) -> Self {
        let mut groups: BTreeMap<PreferenceSignature, BTreeMap<AttractionId, Savers>> =
            BTreeMap::new();
        for (&signature, saved) in data_index.peer_groups() {
            if saved.is_empty() {
                continue;
            }
            let group = groups.entry(signature).or_default();
            for id in saved {
                group.entry(id.clone()).or_default().unattributed += 1;
            }
        }

        for user in data_index.all_users() {
            let Some(group) = user_signature(data_index, &user.id).and_then(|sig| groups.get_mut(&sig))
            else {
                continue;
            };
            for id in &user.saved {
                if let Some(savers) = group.get_mut(id) {
                    if savers.unattributed > 0 && savers.users.insert(user.id.clone()) {
                        savers.unattributed -= 1;
                    }
                }
            }
        }

        Self {
            groups: RwLock::new(groups),
        }
    }

    /// Number of non-empty groups
    pub fn len(&self) -> usize {
        self.groups.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PeerGroupStore for InMemoryPeerGroups {
    fn members(&self, signature: PreferenceSignature) -> Option<Vec<AttractionId>> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups
            .get(&signature)
            .map(|group| group.keys().cloned().collect())
    }

    fn add_member(&self, signature: PreferenceSignature, attraction_id: &str, user_id: &str) -> bool {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        groups
            .entry(signature)
            .or_default()
            .entry(attraction_id.to_string())
            .or_default()
            .users
            .insert(user_id.to_string())
    }

    fn remove_member(
        &self,
        signature: PreferenceSignature,
        attraction_id: &str,
        user_id: &str,
    ) -> bool {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        let Some(group) = groups.get_mut(&signature) else {
            return false;
        };
        let Some(savers) = group.get_mut(attraction_id) else {
            return false;
        };
        if !savers.users.remove(user_id) {
            return false;
        }

        if savers.is_empty() {
            group.remove(attraction_id);
        }
        if group.is_empty() {
            groups.remove(&signature);
        }
        true
    }
}

/// Signature of a user's declared categories; `None` if they declared none
pub fn user_signature(data_index: &DataIndex, user_id: &str) -> Option<PreferenceSignature> {
    data_index
        .get_preferences(user_id)
        .filter(|categories| !categories.is_empty())
        .map(PreferenceSignature::from_categories)
}

/// Apply a like/unlike event to the user's peer group.
///
/// Returns the signature whose group was touched, or `None` when the user
/// declared no preferences (the event is then a no-op here).
pub fn record_save_change(
    store: &dyn PeerGroupStore,
    data_index: &DataIndex,
    user_id: &str,
    attraction_id: &str,
    liked: bool,
) -> Option<PreferenceSignature> {
    let signature = user_signature(data_index, user_id)?;
    let changed = if liked {
        store.add_member(signature, attraction_id, user_id)
    } else {
        store.remove_member(signature, attraction_id, user_id)
    };

    if changed {
        info!(
            "Peer group {} {} a save of {}",
            signature,
            if liked { "gained" } else { "lost" },
            attraction_id
        );
    } else {
        debug!(
            "Peer group {} unchanged: {} already {} {}",
            signature,
            user_id,
            if liked { "saves" } else { "does not save" },
            attraction_id
        );
    }
    Some(signature)
}

pub struct PeerGroupSource {
    data_index: Arc<DataIndex>,
    store: Arc<dyn PeerGroupStore>,
    sampler: Arc<dyn Sampler>,
    sample_size: usize,
}

impl PeerGroupSource {
    pub fn new(
        data_index: Arc<DataIndex>,
        store: Arc<dyn PeerGroupStore>,
        sampler: Arc<dyn Sampler>,
    ) -> Self {
        Self {
            data_index,
            store,
            sampler,
            sample_size: 5,
        }
    }

    /// Configure the maximum number of items returned (default: 5)
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Generate peer-group candidates for a user
    ///
    /// `None` when the user declared no preferences or nobody shares their
    /// signature.
    #[instrument(skip(self))]
    pub fn get_candidates(&self, user_id: &str) -> Option<Vec<RecommendedItem>> {
        let signature = user_signature(&self.data_index, user_id)?;
        let Some(mut members) = self.store.members(signature) else {
            debug!("No peer group for signature {}", signature);
            return None;
        };

        self.sampler.shuffle(&mut members);
        members.truncate(self.sample_size);
        debug!("Peer group {} yielded {} ids", signature, members.len());

        Some(resolve_items(&self.data_index, &members))
    }
}
