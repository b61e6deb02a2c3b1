use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::common::{map_service_error, success_response};
use super::AppState;
use crate::errors::ApiError;

/// All restock schedules with resolved item and vendor.
async fn list_schedules(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let schedules = state
        .services
        .schedules
        .list_schedules()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(schedules))
}

/// Schedules due today (server date, UTC).
async fn due_today(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    let due = state
        .services
        .schedules
        .due_on(today)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(serde_json::json!({
        "date": today,
        "schedules": due,
    })))
}

#[derive(Debug, Deserialize)]
struct RangeParams {
    start: NaiveDate,
    /// Exclusive upper bound
    end: NaiveDate,
}

/// Schedules due in a half-open date range, for calendar views.
async fn due_in_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let due = state
        .services
        .schedules
        .due_in_range(params.start, params.end)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(due))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_schedules))
        .route("/due-today", get(due_today))
        .route("/due", get(due_in_range))
}
