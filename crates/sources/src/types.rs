//! Shared output types for the candidate generators.

use data_loader::{Attraction, AttractionId, DataIndex};
use serde::Serialize;
use tracing::warn;

/// Display metadata for one recommended attraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedItem {
    #[serde(rename = "_id")]
    pub id: AttractionId,
    pub title: String,
    pub city: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Attraction> for RecommendedItem {
    fn from(attraction: &Attraction) -> Self {
        Self {
            id: attraction.id.clone(),
            title: attraction.title.clone(),
            city: attraction.city.clone(),
            image_url: attraction.image_url.clone(),
        }
    }
}

/// Resolve ids to display metadata, keeping order and skipping unknown ids
pub fn resolve_items(data_index: &DataIndex, ids: &[AttractionId]) -> Vec<RecommendedItem> {
    ids.iter()
        .filter_map(|id| match data_index.get_attraction(id) {
            Some(attraction) => Some(RecommendedItem::from(attraction)),
            None => {
                warn!("Skipping unknown attraction {}", id);
                None
            }
        })
        .collect()
}
