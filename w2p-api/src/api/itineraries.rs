//! Itinerary endpoint
//!
//! POST /api/itineraries builds a new plan from a selection of ideas in
//! one transaction: the ideas are put in suggested visiting order, stored
//! as plan items numbered 0..n, and marked PLANNED.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;
use w2p_common::models::{Idea, IdeaStatus, Plan, PlanItem};
use w2p_common::sequencer::sequence;

use super::extract::ApiJson;
use super::plans::{load_plan_detail, RoutedPlanResponse};
use super::validation::require_text;
use crate::db;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateItineraryRequest {
    pub title: String,
    /// RFC 3339 timestamp
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
    /// Selected ideas; order only matters for the starting stop and ties
    pub idea_ids: Vec<Uuid>,
}

impl CreateItineraryRequest {
    fn validate(&self) -> ApiResult<()> {
        require_text("title", &self.title)?;

        if self.idea_ids.is_empty() {
            return Err(ApiError::BadRequest("idea_ids must not be empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.idea_ids.len());
        if let Some(duplicate) = self.idea_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(ApiError::BadRequest(format!("Duplicate idea id: {}", duplicate)));
        }

        Ok(())
    }
}

/// POST /api/itineraries
pub async fn create_itinerary(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateItineraryRequest>,
) -> ApiResult<(StatusCode, Json<RoutedPlanResponse>)> {
    request.validate()?;

    let mut tx = state.db.begin().await?;

    let mut ideas: Vec<Idea> = Vec::with_capacity(request.idea_ids.len());
    for &idea_id in &request.idea_ids {
        let idea = db::ideas::get_idea(&mut *tx, idea_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Idea not found: {}", idea_id)))?;
        ideas.push(idea);
    }

    let order = sequence(ideas.iter().map(Idea::to_locatable));

    let ts = db::now();
    let plan = Plan {
        id: Uuid::new_v4(),
        title: request.title,
        scheduled_for: db::to_storage_precision(request.scheduled_for),
        notes: request.notes,
        created_at: ts,
        updated_at: ts,
    };
    db::plans::insert_plan(&mut *tx, &plan).await?;

    for (position, &idea_id) in order.iter().enumerate() {
        let item = PlanItem {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            idea_id,
            sort_order: position as i64,
        };
        db::plan_items::insert_item(&mut *tx, &item).await?;
        db::ideas::set_idea_status(&mut *tx, idea_id, IdeaStatus::Planned).await?;
    }

    tx.commit().await?;

    let response = RoutedPlanResponse::new(load_plan_detail(&state, plan.id).await?);

    info!(
        plan_id = %plan.id,
        stops = order.len(),
        located = ideas.iter().filter(|idea| idea.coordinate().is_some()).count(),
        route_length = response.route_length,
        "Created itinerary"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Build itinerary routes
pub fn itinerary_routes() -> Router<AppState> {
    Router::new().route("/api/itineraries", post(create_itinerary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(idea_ids: Vec<Uuid>) -> CreateItineraryRequest {
        CreateItineraryRequest {
            title: "Saturday".to_string(),
            scheduled_for: Utc::now(),
            notes: None,
            idea_ids,
        }
    }

    #[test]
    fn test_validate_rejects_empty_selection() {
        assert!(matches!(request(vec![]).validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let id = Uuid::new_v4();
        assert!(matches!(
            request(vec![id, Uuid::new_v4(), id]).validate(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_validate_accepts_distinct_ids() {
        assert!(request(vec![Uuid::new_v4(), Uuid::new_v4()]).validate().is_ok());
    }
}
