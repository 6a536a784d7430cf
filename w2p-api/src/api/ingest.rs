//! Ingest endpoint
//!
//! POST /api/ingest turns pasted text into idea drafts. Nothing is
//! stored; the client posts the drafts it keeps to /api/ideas.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use super::extract::ApiJson;
use super::validation::require_text;
use crate::services::link_preview::{build_drafts, IdeaDraft};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub text: String,
}

/// POST /api/ingest
pub async fn ingest(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IngestRequest>,
) -> ApiResult<Json<Vec<IdeaDraft>>> {
    require_text("text", &request.text)?;

    let drafts = build_drafts(&request.text, state.metadata.as_ref()).await;

    info!(drafts = drafts.len(), "Ingested text");
    Ok(Json(drafts))
}

/// Build ingest routes
pub fn ingest_routes() -> Router<AppState> {
    Router::new().route("/api/ingest", post(ingest))
}
