use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::common::{accepted_response, map_service_error, validate_input};
use super::AppState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize, Validate)]
struct ExportEventRequest {
    #[validate(length(min = 1))]
    title: String,
    #[serde(default)]
    description: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// One-way export of a restock event to the external calendar.
async fn export_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExportEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if payload.end <= payload.start {
        return Err(ApiError::BadRequest(
            "event end must be after start".to_string(),
        ));
    }

    state
        .services
        .calendar
        .export_event(
            &payload.title,
            &payload.description,
            payload.start,
            payload.end,
        )
        .await
        .map_err(map_service_error)?;

    Ok(accepted_response(serde_json::json!({ "exported": true })))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/export", post(export_event))
}
