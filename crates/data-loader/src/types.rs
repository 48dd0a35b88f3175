//! Core domain types for the attraction dataset.
//!
//! This module defines the data structures shared by every crate in the
//! workspace: attractions, reviews, user accounts, declared preferences, the
//! per-request `FeatureVector`, and the two precomputed lookups
//! (`ClusterMembership` and the peer-group `PreferenceSignature`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::DataLoadError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (document-store object id)
pub type UserId = String;

/// Unique identifier for an attraction (document-store object id)
pub type AttractionId = String;

// =============================================================================
// Catalog Types
// =============================================================================

/// A point of interest with the metadata the recommenders need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: AttractionId,
    pub title: String,
    pub city: Option<String>,
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Number of users currently saving this attraction
    pub save_count: u32,
}

/// A single review left by a user for an attraction.
///
/// Both scores are on a 0-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub attraction_id: AttractionId,
    pub user_id: UserId,
    pub green_score: f64,
    pub like_score: f64,
}

/// A user account, reduced to what recommendation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub username: Option<String>,
    /// Saved attractions, oldest first
    pub saved: Vec<AttractionId>,
}

/// Preference categories a user can declare.
///
/// The declaration order is the canonical bit order of a
/// [`PreferenceSignature`]; never reorder these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Nature,
    Animal,
    Architecture,
    History,
    Culture,
    Hiking,
    Park,
    Museum,
    Religion,
    Amusement,
    ScenicSpot,
    Botanical,
    Sport,
}

impl Category {
    /// All categories in canonical signature order
    pub const ALL: [Category; 13] = [
        Category::Nature,
        Category::Animal,
        Category::Architecture,
        Category::History,
        Category::Culture,
        Category::Hiking,
        Category::Park,
        Category::Museum,
        Category::Religion,
        Category::Amusement,
        Category::ScenicSpot,
        Category::Botanical,
        Category::Sport,
    ];

    /// Name used by the preference survey.
    ///
    /// "Senic Spot" is spelled the way stored preferences spell it.
    pub fn name(self) -> &'static str {
        match self {
            Category::Nature => "Nature",
            Category::Animal => "Animal",
            Category::Architecture => "Architecture",
            Category::History => "History",
            Category::Culture => "Culture",
            Category::Hiking => "Hiking",
            Category::Park => "Park",
            Category::Museum => "Museum",
            Category::Religion => "Religion",
            Category::Amusement => "Amusement",
            Category::ScenicSpot => "Senic Spot",
            Category::Botanical => "Botanical",
            Category::Sport => "Sport",
        }
    }

    /// Look up a category by its survey name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Position of this category in the signature (0 = leftmost bit)
    pub fn index(self) -> usize {
        self as usize
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Review aggregates for one attraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractionStats {
    pub review_count: u32,
    pub avg_green_score: f64,
    pub avg_like_score: f64,
}

// =============================================================================
// FeatureVector
// =============================================================================

/// Fixed-schema numeric summary of one attraction in one ranking context.
///
/// Built fresh per request and discarded afterwards. Field names follow the
/// storage layer's camelCase records so untyped rows deserialize directly.
/// `save_count` defaults to 0 when the record omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    #[serde(default, alias = "_id")]
    pub attraction_id: AttractionId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub review_count: u32,
    pub avg_green_score: f64,
    pub avg_like_score: f64,
    #[serde(default)]
    pub save_count: u32,
    pub latitude: f64,
    pub longitude: f64,

    /// Travel distance text from the geo gateway (location-aware pipeline only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    /// Travel duration text from the geo gateway (location-aware pipeline only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl FeatureVector {
    /// Join an attraction's metadata with its review aggregates
    pub fn from_parts(attraction: &Attraction, stats: &AttractionStats) -> Self {
        Self {
            attraction_id: attraction.id.clone(),
            title: attraction.title.clone(),
            city: attraction.city.clone(),
            image_url: attraction.image_url.clone(),
            review_count: stats.review_count,
            avg_green_score: stats.avg_green_score,
            avg_like_score: stats.avg_like_score,
            save_count: attraction.save_count,
            latitude: attraction.latitude,
            longitude: attraction.longitude,
            distance: None,
            duration: None,
        }
    }
}

// =============================================================================
// Precomputed Lookups
// =============================================================================

/// Groups of attractions considered mutually similar.
///
/// Computed offline; an attraction may belong to several groups.
#[derive(Debug, Clone, Default)]
pub struct ClusterMembership {
    groups: Vec<Vec<AttractionId>>,
    by_member: HashMap<AttractionId, Vec<usize>>,
}

impl ClusterMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one similarity group
    pub fn insert_group(&mut self, members: Vec<AttractionId>) {
        let group_idx = self.groups.len();
        for id in &members {
            let entry = self.by_member.entry(id.clone()).or_default();
            // An id listed twice in one group still maps to the group once
            if entry.last() != Some(&group_idx) {
                entry.push(group_idx);
            }
        }
        self.groups.push(members);
    }

    /// Every group that lists `id` as a member, in insertion order
    pub fn groups_containing<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a [AttractionId]> + 'a {
        self.by_member
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| self.groups[idx].as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Fixed-width binary signature of a user's declared categories.
///
/// Bit *i* (counting from the left of the rendered string) is set iff the
/// user declared `Category::ALL[i]`. Users with identical signatures form a
/// peer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreferenceSignature(u16);

impl PreferenceSignature {
    /// Number of bits (one per category)
    pub const WIDTH: usize = Category::ALL.len();

    pub fn from_categories(categories: &[Category]) -> Self {
        let bits = categories
            .iter()
            .fold(0u16, |acc, &c| acc | Self::bit(c));
        Self(bits)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & Self::bit(category) != 0
    }

    /// True when no category is declared
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn bit(category: Category) -> u16 {
        1 << (Self::WIDTH - 1 - category.index())
    }
}

impl fmt::Display for PreferenceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in Category::ALL {
            f.write_str(if self.contains(category) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for PreferenceSignature {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DataLoadError::InvalidValue {
            field: "userIndex".to_string(),
            value: s.to_string(),
        };
        if s.len() != Self::WIDTH {
            return Err(invalid());
        }
        let mut categories = Vec::new();
        for (ch, category) in s.chars().zip(Category::ALL) {
            match ch {
                '1' => categories.push(category),
                '0' => {}
                _ => return Err(invalid()),
            }
        }
        Ok(Self::from_categories(&categories))
    }
}

// =============================================================================
// DataIndex - The In-Memory Store
// =============================================================================

/// Main data structure that holds the dataset and its indices.
///
/// Stands in for the document store: it answers the stats, popularity and
/// catalog queries the recommenders consume. Read-only once loaded, so it is
/// shared between requests through an `Arc`.
#[derive(Debug)]
pub struct DataIndex {
    pub(crate) attractions: HashMap<AttractionId, Attraction>,
    pub(crate) users: HashMap<UserId, UserAccount>,

    /// All reviews written by each user
    pub(crate) user_reviews: HashMap<UserId, Vec<Review>>,
    /// All reviews received by each attraction
    pub(crate) attraction_reviews: HashMap<AttractionId, Vec<Review>>,

    /// Declared categories per user
    pub(crate) preferences: HashMap<UserId, Vec<Category>>,

    pub(crate) clusters: ClusterMembership,
    /// Peer groups as persisted at load time
    pub(crate) peer_groups: BTreeMap<PreferenceSignature, Vec<AttractionId>>,

    // Precomputed statistics
    pub(crate) attraction_stats: HashMap<AttractionId, AttractionStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            attractions: HashMap::new(),
            users: HashMap::new(),
            user_reviews: HashMap::new(),
            attraction_reviews: HashMap::new(),
            preferences: HashMap::new(),
            clusters: ClusterMembership::new(),
            peer_groups: BTreeMap::new(),
            attraction_stats: HashMap::new(),
        }
    }

    pub fn get_attraction(&self, id: &str) -> Option<&Attraction> {
        self.attractions.get(id)
    }

    pub fn get_user(&self, id: &str) -> Option<&UserAccount> {
        self.users.get(id)
    }

    /// All reviews written by a user (empty slice if none)
    pub fn get_user_reviews(&self, user_id: &str) -> &[Review] {
        self.user_reviews
            .get(user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All reviews for an attraction (empty slice if none)
    pub fn get_attraction_reviews(&self, attraction_id: &str) -> &[Review] {
        self.attraction_reviews
            .get(attraction_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Declared categories for a user, if they answered the survey
    pub fn get_preferences(&self, user_id: &str) -> Option<&[Category]> {
        self.preferences.get(user_id).map(|v| v.as_slice())
    }

    /// Precomputed review aggregates for an attraction
    pub fn get_attraction_stats(&self, attraction_id: &str) -> Option<&AttractionStats> {
        self.attraction_stats.get(attraction_id)
    }

    pub fn clusters(&self) -> &ClusterMembership {
        &self.clusters
    }

    /// Peer groups loaded from disk, keyed by signature
    pub fn peer_groups(&self) -> &BTreeMap<PreferenceSignature, Vec<AttractionId>> {
        &self.peer_groups
    }

    pub fn all_attractions(&self) -> impl Iterator<Item = &Attraction> {
        self.attractions.values()
    }

    pub fn all_users(&self) -> impl Iterator<Item = &UserAccount> {
        self.users.values()
    }

    pub fn insert_attraction(&mut self, attraction: Attraction) {
        self.attractions.insert(attraction.id.clone(), attraction);
    }

    pub fn insert_user(&mut self, user: UserAccount) {
        self.users.insert(user.id.clone(), user);
    }

    /// Insert a review and update both review indices
    pub fn insert_review(&mut self, review: Review) {
        self.user_reviews
            .entry(review.user_id.clone())
            .or_default()
            .push(review.clone());

        self.attraction_reviews
            .entry(review.attraction_id.clone())
            .or_default()
            .push(review);
    }

    pub fn insert_preferences(&mut self, user_id: UserId, categories: Vec<Category>) {
        self.preferences.insert(user_id, categories);
    }

    pub fn insert_cluster(&mut self, members: Vec<AttractionId>) {
        self.clusters.insert_group(members);
    }

    pub fn insert_peer_group(&mut self, signature: PreferenceSignature, saved: Vec<AttractionId>) {
        self.peer_groups.entry(signature).or_default().extend(saved);
    }

    /// (attractions, users, reviews) counts for logging and validation
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_reviews = self.user_reviews.values().map(|v| v.len()).sum();
        (self.attractions.len(), self.users.len(), total_reviews)
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
