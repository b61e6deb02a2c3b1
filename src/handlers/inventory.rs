use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::common::{map_service_error, success_response, PaginationMeta, PaginationParams};
use super::AppState;
use crate::errors::ApiError;

/// List inventory items with resolved vendor name and stock status.
async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = pagination.effective();
    let (items, total) = state
        .services
        .inventory
        .list_items(page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "items": items,
        "pagination": PaginationMeta::new(page, per_page, total),
    })))
}

/// Fetch a single inventory item.
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .inventory
        .get_item(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_items))
        .route("/:id", get(get_item))
}
