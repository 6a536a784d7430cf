//! Geocode endpoint
//!
//! POST /api/geocode looks up candidate places for a free-text query.
//! The client attaches the chosen one to an idea with PATCH /api/ideas/:id.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{debug, warn};

use super::extract::ApiJson;
use super::validation::require_text;
use crate::services::GeocodeResult;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub query: String,
}

/// POST /api/geocode
pub async fn geocode(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GeocodeRequest>,
) -> ApiResult<Json<Vec<GeocodeResult>>> {
    require_text("query", &request.query)?;

    let results = state
        .geocoder
        .geocode(request.query.trim())
        .await
        .inspect_err(|e| warn!(query = %request.query, "Geocoding failed: {}", e))?;

    debug!(query = %request.query, results = results.len(), "Geocoded place");
    Ok(Json(results))
}

/// Build geocode routes
pub fn geocode_routes() -> Router<AppState> {
    Router::new().route("/api/geocode", post(geocode))
}
