use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::common::{map_service_error, success_response};
use super::AppState;
use crate::errors::ApiError;
use crate::services::calls::dial_link;

/// Active vendors, alphabetical.
async fn list_vendors(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let vendors = state
        .services
        .vendors
        .list_active()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

/// Direct device dial-out link for a vendor. No call is placed server-side.
async fn dial_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state
        .services
        .vendors
        .get(id)
        .await
        .map_err(map_service_error)?;

    let phone = vendor
        .phone
        .ok_or_else(|| ApiError::BadRequest(format!("vendor {} has no phone number", id)))?;

    Ok(success_response(serde_json::json!({
        "vendor": vendor.name,
        "dial_url": dial_link(&phone),
    })))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_vendors))
        .route("/:id/dial", post(dial_vendor))
}
