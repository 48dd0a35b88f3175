//! Most-saved Source - cold-start shortlist
//!
//! Needs no user signal at all: the attractions with the highest save
//! counts, ties broken by id so the list is stable.

use crate::types::RecommendedItem;
use data_loader::DataIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct MostSavedSource {
    data_index: Arc<DataIndex>,
}

impl MostSavedSource {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self { data_index }
    }

    #[instrument(skip(self))]
    pub fn get_candidates(&self, limit: usize) -> Vec<RecommendedItem> {
        let items: Vec<RecommendedItem> = self
            .data_index
            .most_saved(limit)
            .into_iter()
            .map(RecommendedItem::from)
            .collect();
        debug!("Generated {} most-saved candidates", items.len());
        items
    }
}
