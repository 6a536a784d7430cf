//! Idea endpoints
//!
//! - GET    /api/ideas      list with optional filters
//! - POST   /api/ideas      create
//! - GET    /api/ideas/:id  fetch one
//! - PATCH  /api/ideas/:id  partial update (`null` clears a field)
//! - DELETE /api/ideas/:id  delete (removes it from every plan)

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;
use w2p_common::models::{Category, Idea, IdeaStatus, Source};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::validation::{double_option, require_text, validate_url};
use crate::db::{self, ideas::IdeaFilter};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for listing ideas
///
/// Empty values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct IdeasQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    /// Only ideas with a usable position (map view)
    #[serde(default)]
    pub located: bool,
}

impl IdeasQuery {
    fn into_filter(self) -> ApiResult<IdeaFilter> {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Ok(IdeaFilter {
            category: non_empty(self.category).map(|c| c.parse()).transpose()?,
            status: non_empty(self.status).map(|s| s.parse()).transpose()?,
            search: non_empty(self.search),
            located_only: self.located,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Source,
    pub category: Option<Category>,
    pub status: Option<IdeaStatus>,
    pub image_url: Option<String>,
    pub place_name: Option<String>,
    pub place_address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub raw_text: Option<String>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIdeaRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    pub source: Option<Source>,
    pub category: Option<Category>,
    pub status: Option<IdeaStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub place_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub place_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lng: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub raw_text: Option<Option<String>>,
}

impl UpdateIdeaRequest {
    fn apply(self, idea: &mut Idea) {
        fn patch<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        patch(&mut idea.title, self.title);
        patch(&mut idea.description, self.description);
        patch(&mut idea.url, self.url);
        patch(&mut idea.source, self.source);
        patch(&mut idea.category, self.category);
        patch(&mut idea.status, self.status);
        patch(&mut idea.image_url, self.image_url);
        patch(&mut idea.place_name, self.place_name);
        patch(&mut idea.place_address, self.place_address);
        patch(&mut idea.lat, self.lat);
        patch(&mut idea.lng, self.lng);
        patch(&mut idea.raw_text, self.raw_text);
    }
}

fn validate_idea(idea: &Idea) -> ApiResult<()> {
    require_text("title", &idea.title)?;
    validate_url("url", idea.url.as_deref())?;
    validate_url("image_url", idea.image_url.as_deref())?;
    Ok(())
}

async fn load_idea(state: &AppState, id: Uuid) -> ApiResult<Idea> {
    db::ideas::get_idea(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Idea not found: {}", id)))
}

/// GET /api/ideas
pub async fn list_ideas(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdeasQuery>,
) -> ApiResult<Json<Vec<Idea>>> {
    let filter = query.into_filter()?;
    let ideas = db::ideas::list_ideas(&state.db, &filter).await?;

    debug!(count = ideas.len(), ?filter, "Listed ideas");
    Ok(Json(ideas))
}

/// POST /api/ideas
pub async fn create_idea(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateIdeaRequest>,
) -> ApiResult<(StatusCode, Json<Idea>)> {
    let ts = db::now();
    let idea = Idea {
        id: Uuid::new_v4(),
        title: request.title,
        description: request.description,
        url: request.url,
        source: request.source,
        category: request.category.unwrap_or_default(),
        status: request.status.unwrap_or_default(),
        image_url: request.image_url,
        place_name: request.place_name,
        place_address: request.place_address,
        lat: request.lat,
        lng: request.lng,
        raw_text: request.raw_text,
        created_at: ts,
        updated_at: ts,
    };
    validate_idea(&idea)?;

    db::ideas::insert_idea(&state.db, &idea).await?;

    info!(idea_id = %idea.id, source = %idea.source, "Created idea");
    Ok((StatusCode::CREATED, Json(idea)))
}

/// GET /api/ideas/:id
pub async fn get_idea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Idea>> {
    Ok(Json(load_idea(&state, id).await?))
}

/// PATCH /api/ideas/:id
pub async fn update_idea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateIdeaRequest>,
) -> ApiResult<Json<Idea>> {
    let mut idea = load_idea(&state, id).await?;

    request.apply(&mut idea);
    validate_idea(&idea)?;
    idea.updated_at = db::now();

    db::ideas::update_idea(&state.db, &idea).await?;

    info!(idea_id = %idea.id, "Updated idea");
    Ok(Json(idea))
}

/// DELETE /api/ideas/:id
pub async fn delete_idea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    if !db::ideas::delete_idea(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Idea not found: {}", id)));
    }

    info!(idea_id = %id, "Deleted idea");
    Ok(Json(json!({ "success": true })))
}

/// Build idea routes
pub fn idea_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ideas", get(list_ideas).post(create_idea))
        .route(
            "/api/ideas/:id",
            get(get_idea).patch(update_idea).delete(delete_idea),
        )
}
