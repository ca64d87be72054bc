//! Engine status route

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use diet_planner_shared::StatusResponse;

/// Create status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// GET /status - Report whether the dataset and model are loaded
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.engine().status())
}
