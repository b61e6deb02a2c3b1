//! Backend service for a procurement-management dashboard.
//!
//! Serves inventory levels, vendor lists, restock schedules, and active
//! restock orders, and drives the multi-step new-order workflow: vendor
//! discovery, simulated/initiated outbound negotiation calls, and
//! purchase-order generation.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod services;

pub use handlers::{AppServices, AppState};

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Assembles the full application router over shared state.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", handlers::health::routes())
        .nest("/api/v1", handlers::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
