use axum::{extract::State, response::IntoResponse, routing::get, Router};
use sea_orm::{ConnectionTrait, Statement};
use std::sync::Arc;

use super::common::success_response;
use super::AppState;

/// Liveness plus a database round trip.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_ok = state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    success_response(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
    }))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health))
}
