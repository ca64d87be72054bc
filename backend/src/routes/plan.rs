//! Plan generation API routes

use crate::error::ApiResult;
use crate::services::PlanService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use diet_planner_shared::{PlanRequest, PlanResponse};
use std::sync::Arc;

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/generate_plan", post(generate_plan))
}

/// POST /generate_plan - Build a weekly meal and workout plan
///
/// Unknown or malformed field values fall back to defaults; only a body
/// that is not valid JSON of the request shape is rejected.
async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult<Json<PlanResponse>> {
    let Json(request) = payload?;
    let engine = Arc::clone(&state.engine);

    let response = tokio::task::spawn_blocking(move || PlanService::generate(&engine, &request)).await?;

    Ok(Json(response))
}
