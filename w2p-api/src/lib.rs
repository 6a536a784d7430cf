//! w2p-api library - Wish2Plan HTTP service
//!
//! Exposes the router and state so integration tests can drive the
//! service without binding a socket.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{Geocoder, MetadataFetcher};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Place lookup
    pub geocoder: Arc<dyn Geocoder>,
    /// Link metadata lookup for ingest
    pub metadata: Arc<dyn MetadataFetcher>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        geocoder: Arc<dyn Geocoder>,
        metadata: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            db,
            geocoder,
            metadata,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::idea_routes())
        .merge(api::plan_routes())
        .merge(api::itinerary_routes())
        .merge(api::ingest_routes())
        .merge(api::geocode_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
