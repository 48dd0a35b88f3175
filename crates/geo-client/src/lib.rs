//! Travel distance client for location-aware recommendations.
//!
//! This crate provides the `DistanceGateway` seam the orchestrator calls to
//! turn an (origin, destination) pair into human-readable travel distance and
//! duration text. It handles:
//! - Calling the Google Distance Matrix JSON API over HTTP
//! - Mapping service and element statuses onto `GatewayError`
//! - An offline great-circle gateway for development and tests
//!
//! Callers own retries and timeouts; nothing here retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Public Distance Matrix endpoint
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when asking for a travel estimate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Distance request failed: {0}")]
    Request(String),

    #[error("Distance request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Distance service quota exhausted: {0}")]
    Quota(String),

    #[error("Distance service returned status {0}")]
    Status(String),

    #[error("No route found ({status})")]
    NoRoute { status: String },

    #[error("Invalid response from distance service: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and within their degree ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Human-readable travel distance and duration, e.g. `"12.3 km"` / `"18 mins"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub distance: String,
    pub duration: String,
}

/// Source of travel estimates between two points.
///
/// `Send + Sync` so one gateway can serve concurrent lookups.
#[async_trait]
pub trait DistanceGateway: Send + Sync {
    async fn travel(&self, origin: Coordinates, destination: Coordinates) -> Result<TravelEstimate>;
}

// =============================================================================
// Distance Matrix API
// =============================================================================

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

/// Read the single origin/destination element of a Distance Matrix response
pub fn parse_distance_matrix(body: &str) -> Result<TravelEstimate> {
    let response: MatrixResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {}
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            return Err(GatewayError::Quota(
                response.error_message.unwrap_or(response.status),
            ));
        }
        _ => return Err(GatewayError::Status(response.status)),
    }

    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| GatewayError::InvalidResponse("response has no elements".into()))?;

    match element.status.as_str() {
        "OK" => {}
        "NOT_FOUND" | "ZERO_RESULTS" => {
            return Err(GatewayError::NoRoute {
                status: element.status,
            });
        }
        _ => return Err(GatewayError::Status(element.status)),
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(TravelEstimate {
            distance: distance.text,
            duration: duration.text,
        }),
        _ => Err(GatewayError::InvalidResponse(
            "element is missing distance or duration".into(),
        )),
    }
}

/// Client for the Google Distance Matrix API.
pub struct DistanceMatrixClient {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl DistanceMatrixClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at a different endpoint (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Per-request timeout enforced by the HTTP client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DistanceGateway for DistanceMatrixClient {
    async fn travel(&self, origin: Coordinates, destination: Coordinates) -> Result<TravelEstimate> {
        debug!("Distance lookup {} -> {}", origin, destination);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin.to_string()),
                ("destinations", destination.to_string()),
                ("key", self.api_key.clone()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout)
                } else {
                    error!("Distance request error: {}", e);
                    GatewayError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            warn!("Distance service HTTP status {}", response.status());
            return Err(GatewayError::Status(response.status().to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parse_distance_matrix(&body)
    }
}

// =============================================================================
// Offline gateway
// =============================================================================

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Offline gateway: straight-line distance at a fixed average speed.
///
/// Always reports kilometres so the leading number is comparable across
/// candidates.
#[derive(Debug, Clone)]
pub struct HaversineGateway {
    average_speed_kmh: f64,
}

impl Default for HaversineGateway {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
        }
    }
}

impl HaversineGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_average_speed(mut self, kmh: f64) -> Self {
        self.average_speed_kmh = kmh;
        self
    }

    /// Estimate without going through the async trait
    pub fn estimate(&self, origin: Coordinates, destination: Coordinates) -> Result<TravelEstimate> {
        if !origin.is_valid() || !destination.is_valid() {
            return Err(GatewayError::NoRoute {
                status: "INVALID_COORDINATES".to_string(),
            });
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(GatewayError::Status(format!(
                "invalid average speed {}",
                self.average_speed_kmh
            )));
        }

        let km = haversine_km(origin, destination);
        let minutes = (km / self.average_speed_kmh * 60.0).round().max(1.0) as u64;
        Ok(TravelEstimate {
            distance: format_km(km),
            duration: format_minutes(minutes),
        })
    }
}

#[async_trait]
impl DistanceGateway for HaversineGateway {
    async fn travel(&self, origin: Coordinates, destination: Coordinates) -> Result<TravelEstimate> {
        self.estimate(origin, destination)
    }
}

/// `"0.8 km"`, `"12.3 km"`, `"1,234 km"`
fn format_km(km: f64) -> String {
    if km < 100.0 {
        format!("{:.1} km", km)
    } else {
        format!("{} km", group_thousands(km.round() as u64))
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"1 min"`, `"18 mins"`, `"1 hour 5 mins"`, `"3 hours"`
fn format_minutes(minutes: u64) -> String {
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => plural(m, "min"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "min")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYDNEY: Coordinates = Coordinates {
        latitude: -33.8688,
        longitude: 151.2093,
    };
    const MELBOURNE: Coordinates = Coordinates {
        latitude: -37.8136,
        longitude: 144.9631,
    };

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "OK",
            "origin_addresses": ["Sydney NSW, Australia"],
            "destination_addresses": ["Bondi Beach NSW 2026, Australia"],
            "rows": [{"elements": [{
                "status": "OK",
                "distance": {"text": "7.4 km", "value": 7412},
                "duration": {"text": "18 mins", "value": 1080}
            }]}]
        }"#;
        let estimate = parse_distance_matrix(body).unwrap();
        assert_eq!(estimate.distance, "7.4 km");
        assert_eq!(estimate.duration, "18 mins");
    }

    #[test]
    fn test_parse_quota_status() {
        let body = r#"{"status": "OVER_QUERY_LIMIT", "error_message": "You have exceeded your daily request quota", "rows": []}"#;
        assert!(matches!(
            parse_distance_matrix(body),
            Err(GatewayError::Quota(msg)) if msg.contains("quota")
        ));
    }

    #[test]
    fn test_parse_denied_status() {
        let body = r#"{"status": "REQUEST_DENIED", "rows": []}"#;
        assert_eq!(
            parse_distance_matrix(body),
            Err(GatewayError::Status("REQUEST_DENIED".into()))
        );
    }

    #[test]
    fn test_parse_zero_results_element() {
        let body = r#"{"status": "OK", "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]}"#;
        assert!(matches!(
            parse_distance_matrix(body),
            Err(GatewayError::NoRoute { .. })
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_distance_matrix("<html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_distance_matrix(r#"{"status": "OK", "rows": []}"#),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_haversine_sydney_melbourne() {
        let km = haversine_km(SYDNEY, MELBOURNE);
        assert!((km - 713.0).abs() < 5.0, "got {}", km);
        assert_eq!(haversine_km(SYDNEY, SYDNEY), 0.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_km(0.84), "0.8 km");
        assert_eq!(format_km(12.34), "12.3 km");
        assert_eq!(format_km(1234.4), "1,234 km");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(format_minutes(1), "1 min");
        assert_eq!(format_minutes(18), "18 mins");
        assert_eq!(format_minutes(65), "1 hour 5 mins");
        assert_eq!(format_minutes(180), "3 hours");
    }

    #[test]
    fn test_invalid_coordinates_have_no_route() {
        let bad = Coordinates::new(f64::NAN, 10.0);
        assert!(matches!(
            HaversineGateway::new().estimate(bad, SYDNEY),
            Err(GatewayError::NoRoute { .. })
        ));
    }

    #[tokio::test]
    async fn test_haversine_gateway_travel() {
        let gateway = HaversineGateway::new().with_average_speed(60.0);
        let estimate = gateway.travel(SYDNEY, MELBOURNE).await.unwrap();
        assert!(estimate.distance.ends_with(" km"));
        assert!(estimate.duration.contains("hours"));
    }

    #[test]
    fn test_client_builder() {
        let client = DistanceMatrixClient::new("key")
            .with_endpoint("http://localhost:9999/distancematrix/json")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(client.endpoint(), "http://localhost:9999/distancematrix/json");
    }
}
