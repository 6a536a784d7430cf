//! Plan and plan item endpoints
//!
//! - GET    /api/plans                          list with items, soonest first
//! - POST   /api/plans                          create
//! - GET    /api/plans/:id                      fetch with items
//! - PATCH  /api/plans/:id                      partial update
//! - DELETE /api/plans/:id                      delete
//! - POST   /api/plans/:id/items                add an idea
//! - DELETE /api/plans/:id/items/:item_id       remove an item
//! - POST   /api/plans/:id/items/auto-order     reorder items as a route

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use w2p_common::models::{Plan, PlanDetail, PlanItem};
use w2p_common::sequencer::{route_length, sequence, LocatableItem};

use super::extract::{ApiJson, ApiPath};
use super::validation::{double_option, require_text};
use crate::db;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub title: String,
    /// RFC 3339 timestamp
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub idea_id: Uuid,
    /// Defaults to the end of the plan
    pub sort_order: Option<i64>,
}

/// Plan detail plus the straight-line length of its located stops
#[derive(Debug, Serialize)]
pub struct RoutedPlanResponse {
    #[serde(flatten)]
    pub detail: PlanDetail,
    pub route_length: f64,
}

impl RoutedPlanResponse {
    pub fn new(detail: PlanDetail) -> Self {
        let path: Vec<_> = detail
            .items
            .iter()
            .filter_map(|entry| entry.idea.coordinate())
            .collect();

        Self {
            route_length: route_length(&path),
            detail,
        }
    }
}

pub(crate) async fn load_plan_detail(state: &AppState, id: Uuid) -> ApiResult<PlanDetail> {
    db::plans::load_plan_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plan not found: {}", id)))
}

async fn load_plan(state: &AppState, id: Uuid) -> ApiResult<Plan> {
    db::plans::get_plan(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plan not found: {}", id)))
}

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<PlanDetail>>> {
    Ok(Json(db::plans::list_plan_details(&state.db).await?))
}

/// POST /api/plans
pub async fn create_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<Plan>)> {
    require_text("title", &request.title)?;

    let ts = db::now();
    let plan = Plan {
        id: Uuid::new_v4(),
        title: request.title,
        scheduled_for: db::to_storage_precision(request.scheduled_for),
        notes: request.notes,
        created_at: ts,
        updated_at: ts,
    };

    db::plans::insert_plan(&state.db, &plan).await?;

    info!(plan_id = %plan.id, scheduled_for = %plan.scheduled_for, "Created plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/plans/:id
pub async fn get_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PlanDetail>> {
    Ok(Json(load_plan_detail(&state, id).await?))
}

/// PATCH /api/plans/:id
pub async fn update_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdatePlanRequest>,
) -> ApiResult<Json<Plan>> {
    let mut plan = load_plan(&state, id).await?;

    if let Some(title) = request.title {
        require_text("title", &title)?;
        plan.title = title;
    }
    if let Some(scheduled_for) = request.scheduled_for {
        plan.scheduled_for = db::to_storage_precision(scheduled_for);
    }
    if let Some(notes) = request.notes {
        plan.notes = notes;
    }
    plan.updated_at = db::now();

    db::plans::update_plan(&state.db, &plan).await?;

    info!(plan_id = %plan.id, "Updated plan");
    Ok(Json(plan))
}

/// DELETE /api/plans/:id
pub async fn delete_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    if !db::plans::delete_plan(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Plan not found: {}", id)));
    }

    info!(plan_id = %id, "Deleted plan");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/plans/:id/items
pub async fn add_item(
    State(state): State<AppState>,
    ApiPath(plan_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<PlanItem>)> {
    let mut tx = state.db.begin().await?;

    db::plans::get_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plan not found: {}", plan_id)))?;
    db::ideas::get_idea(&mut *tx, request.idea_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Idea not found: {}", request.idea_id)))?;

    let sort_order = match request.sort_order {
        Some(sort_order) => sort_order,
        None => db::plan_items::count_items(&mut *tx, plan_id).await?,
    };

    let item = PlanItem {
        id: Uuid::new_v4(),
        plan_id,
        idea_id: request.idea_id,
        sort_order,
    };
    db::plan_items::insert_item(&mut *tx, &item)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::Conflict("Idea already in plan".to_string())
            } else {
                e.into()
            }
        })?;

    tx.commit().await?;

    info!(plan_id = %plan_id, idea_id = %item.idea_id, sort_order, "Added idea to plan");
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/plans/:id/items/:item_id
pub async fn remove_item(
    State(state): State<AppState>,
    ApiPath((plan_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    load_plan(&state, plan_id).await?;

    if !db::plan_items::delete_item(&state.db, plan_id, item_id).await? {
        return Err(ApiError::NotFound(format!("Plan item not found: {}", item_id)));
    }

    info!(plan_id = %plan_id, item_id = %item_id, "Removed idea from plan");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/plans/:id/items/auto-order
///
/// Renumbers the plan's items 0..n in suggested visiting order. The
/// current order seeds the walk, so the first located stop stays first.
pub async fn auto_order_items(
    State(state): State<AppState>,
    ApiPath(plan_id): ApiPath<Uuid>,
) -> ApiResult<Json<RoutedPlanResponse>> {
    let mut tx = state.db.begin().await?;

    db::plans::get_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Plan not found: {}", plan_id)))?;
    let items = db::plan_items::list_items_with_ideas(&mut *tx, plan_id).await?;

    let order = sequence(
        items
            .iter()
            .map(|entry| LocatableItem::new(entry.item.id, entry.idea.coordinate())),
    );

    for (position, item_id) in order.iter().enumerate() {
        db::plan_items::set_sort_order(&mut *tx, *item_id, position as i64).await?;
    }
    tx.commit().await?;

    let detail = load_plan_detail(&state, plan_id).await?;
    let response = RoutedPlanResponse::new(detail);

    info!(
        plan_id = %plan_id,
        items = order.len(),
        route_length = response.route_length,
        "Auto-ordered plan items"
    );
    Ok(Json(response))
}

/// Build plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(list_plans).post(create_plan))
        .route(
            "/api/plans/:id",
            get(get_plan).patch(update_plan).delete(delete_plan),
        )
        .route("/api/plans/:id/items", post(add_item))
        .route("/api/plans/:id/items/auto-order", post(auto_order_items))
        .route("/api/plans/:id/items/:item_id", delete(remove_item))
}
