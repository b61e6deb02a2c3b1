pub mod calendar;
pub mod common;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod schedules;
pub mod vendors;
pub mod workflows;

use axum::Router;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::calendar::CalendarExportService;
use crate::services::inventory::InventoryService;
use crate::services::orders::OrderService;
use crate::services::schedules::ScheduleService;
use crate::services::vendors::VendorService;
use crate::services::workflow::OrderWorkflowService;

/// Services consumed by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub vendors: Arc<VendorService>,
    pub schedules: Arc<ScheduleService>,
    pub orders: Arc<OrderService>,
    pub workflows: Arc<OrderWorkflowService>,
    pub calendar: Arc<CalendarExportService>,
}

/// Shared application state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub services: AppServices,
}

/// Versioned API routes.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/inventory", inventory::routes())
        .nest("/vendors", vendors::routes())
        .nest("/restock-schedules", schedules::routes())
        .nest("/orders", orders::routes())
        .nest("/workflows", workflows::routes())
        .nest("/calendar", calendar::routes())
}
