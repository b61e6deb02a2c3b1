use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use super::common::{map_service_error, success_response};
use super::AppState;
use crate::errors::ApiError;

/// Open restock orders for the dashboard table.
async fn list_active_orders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_active_orders()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_active_orders))
}
