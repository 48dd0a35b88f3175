//! Parser for the attraction dataset files.
//!
//! Each file is a JSON array exported from the document store:
//! - attractions.json: `{ _id, title, city, imageUrl, location/lat, location/lng, saveCount }`
//! - reviews.json: `{ attractionId, userId, green_score, like_score }`
//! - users.json: `{ _id, username, saved: [attractionId, ...] }`
//! - preferences.json: `{ userId, preference: [category, ...] }`
//! - clusters.json: `{ ids_list: [attractionId, ...] }`
//! - user_groups.json: `{ userIndex, savedAttractions: [attractionId, ...] }`
//!
//! The raw record structs mirror the stored field names exactly; they are
//! converted into the domain types here so that the rest of the workspace
//! only ever sees the strict schema.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct AttractionRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(rename = "imageUrl", default)]
    image_url: Option<String>,
    #[serde(rename = "location/lat")]
    latitude: f64,
    #[serde(rename = "location/lng")]
    longitude: f64,
    #[serde(rename = "saveCount", default)]
    save_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    #[serde(rename = "attractionId")]
    attraction_id: String,
    #[serde(rename = "userId")]
    user_id: String,
    green_score: f64,
    like_score: f64,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    saved: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PreferenceRecord {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    preference: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClusterRecord {
    ids_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserGroupRecord {
    #[serde(rename = "userIndex")]
    user_index: String,
    #[serde(rename = "savedAttractions", default)]
    saved_attractions: Vec<String>,
}

/// Read a JSON array file into raw records
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| DataLoadError::MalformedRecord {
        file: file_label(path),
        reason: e.to_string(),
    })
}

/// Like `read_json_array`, but a missing file is an empty dataset
fn read_optional_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("{} not present, treating as empty", path.display());
        return Ok(Vec::new());
    }
    read_json_array(path)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the attractions.json file
///
/// A missing saveCount is stored as 0; a negative one is rejected.
pub fn parse_attractions(path: &Path) -> Result<Vec<Attraction>> {
    let records: Vec<AttractionRecord> = read_json_array(path)?;
    records
        .into_iter()
        .map(|r| -> Result<Attraction> {
            let save_count = match r.save_count {
                None => 0,
                Some(n) => u32::try_from(n).map_err(|_| DataLoadError::InvalidValue {
                    field: format!("saveCount of attraction {}", r.id),
                    value: n.to_string(),
                })?,
            };
            Ok(Attraction {
                id: r.id,
                title: r.title,
                city: r.city,
                image_url: r.image_url,
                latitude: r.latitude,
                longitude: r.longitude,
                save_count,
            })
        })
        .collect()
}

/// Parse the reviews.json file
pub fn parse_reviews(path: &Path) -> Result<Vec<Review>> {
    let records: Vec<ReviewRecord> = read_json_array(path)?;
    Ok(records
        .into_iter()
        .map(|r| Review {
            attraction_id: r.attraction_id,
            user_id: r.user_id,
            green_score: r.green_score,
            like_score: r.like_score,
        })
        .collect())
}

/// Parse the users.json file
pub fn parse_users(path: &Path) -> Result<Vec<UserAccount>> {
    let records: Vec<UserRecord> = read_json_array(path)?;
    Ok(records
        .into_iter()
        .map(|r| UserAccount {
            id: r.id,
            username: r.username,
            saved: r.saved,
        })
        .collect())
}

/// Parse the preferences.json file
///
/// Unknown category names are skipped; they cannot set a signature bit.
pub fn parse_preferences(path: &Path) -> Result<Vec<(UserId, Vec<Category>)>> {
    let records: Vec<PreferenceRecord> = read_optional_json_array(path)?;
    Ok(records
        .into_iter()
        .map(|r| {
            let categories = parse_categories(&r.preference);
            (r.user_id, categories)
        })
        .collect())
}

/// Parse the clusters.json file
pub fn parse_clusters(path: &Path) -> Result<Vec<Vec<AttractionId>>> {
    let records: Vec<ClusterRecord> = read_optional_json_array(path)?;
    Ok(records.into_iter().map(|r| r.ids_list).collect())
}

/// Parse the user_groups.json file
pub fn parse_user_groups(path: &Path) -> Result<Vec<(PreferenceSignature, Vec<AttractionId>)>> {
    let records: Vec<UserGroupRecord> = read_optional_json_array(path)?;
    records
        .into_iter()
        .map(|r| -> Result<(PreferenceSignature, Vec<AttractionId>)> {
            Ok((r.user_index.parse()?, r.saved_attractions))
        })
        .collect()
}

/// Map survey names onto categories, dropping names we do not know
pub fn parse_categories(names: &[String]) -> Vec<Category> {
    names
        .iter()
        .filter_map(|name| {
            let category = Category::from_name(name);
            if category.is_none() {
                warn!("Ignoring unknown preference category {:?}", name);
            }
            category
        })
        .collect()
}
