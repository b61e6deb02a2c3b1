use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, map_service_error, success_response, validate_input};
use super::AppState;
use crate::errors::ApiError;

/// Create a fresh workflow session for one browser view.
async fn create_workflow(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let id = state.services.workflows.create_session();
    created_response(serde_json::json!({ "workflow_id": id }))
}

#[derive(Debug, Deserialize, Validate)]
struct StartSearchRequest {
    #[validate(length(min = 1))]
    query: String,
}

/// Start (or restart) the new-order workflow for a query. An empty query
/// is a 400 and leaves the session untouched.
async fn start_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartSearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    state
        .services
        .workflows
        .start_search(id, &payload.query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(serde_json::json!({
        "workflow_id": id,
        "status": "searching",
    })))
}

/// Poll the session: phase, revealed messages, vendors, purchase order.
async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .services
        .workflows
        .snapshot(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(snapshot))
}

/// Discard a session (navigating away). In-flight timers are ignored.
async fn discard_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .workflows
        .discard_session(id)
        .map_err(map_service_error)?;
    Ok(success_response(serde_json::json!({ "workflow_id": id })))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_workflow))
        .route("/:id", get(get_workflow))
        .route("/:id", delete(discard_workflow))
        .route("/:id/search", post(start_search))
}
