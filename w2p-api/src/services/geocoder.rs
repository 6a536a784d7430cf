//! Place lookup
//!
//! Resolves free-text place names to coordinates using the Mapbox forward
//! geocoding API (`mapbox.places`, 5 results per query).
//!
//! The [`Geocoder`] trait is the seam handlers depend on, so tests can
//! swap in a canned implementation without network access.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Mapbox geocoding base URL
const MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Maximum results requested per lookup
const RESULT_LIMIT: usize = 5;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One candidate place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub id: String,
    pub place_name: String,
    pub place_address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Mapbox token not configured")]
    NotConfigured,

    #[error("Geocoding request failed: {0}")]
    Network(String),

    #[error("Geocoding API returned {0}")]
    Api(u16),

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),
}

/// Place lookup service
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError>;
}

/// Mapbox-backed geocoder
pub struct MapboxGeocoder {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl MapboxGeocoder {
    pub fn new(token: Option<String>) -> Result<Self, GeocodeError> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: MAPBOX_GEOCODING_URL.to_string(),
            token,
        })
    }

    /// Point at a different endpoint (local mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let token = self.token.as_deref().ok_or(GeocodeError::NotConfigured)?;

        // The query is a path segment; Url handles percent-encoding
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| GeocodeError::Network(format!("Invalid geocoding URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GeocodeError::Network("Geocoding URL cannot be a base".to_string()))?
            .push(&format!("{}.json", query));
        url.query_pairs_mut()
            .append_pair("access_token", token)
            .append_pair("limit", &RESULT_LIMIT.to_string());

        debug!(query = %query, "Querying Mapbox geocoding");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "Mapbox geocoding returned error");
            return Err(GeocodeError::Api(status));
        }

        let body: MapboxResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        Ok(body.into_results())
    }
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    id: String,
    #[serde(default)]
    text: Option<String>,
    place_name: String,
    /// `[lng, lat]`
    center: [f64; 2],
}

impl MapboxResponse {
    fn into_results(self) -> Vec<GeocodeResult> {
        self.features
            .into_iter()
            .take(RESULT_LIMIT)
            .map(|feature| GeocodeResult {
                id: feature.id,
                place_name: feature
                    .text
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| feature.place_name.clone()),
                place_address: feature.place_name,
                lat: feature.center[1],
                lng: feature.center[0],
            })
            .collect()
    }
}
