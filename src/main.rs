use std::{net::SocketAddr, sync::Arc};

use tokio::signal;
use tracing::{error, info};

use procure_api as api;
use procure_api::services::calendar::CalendarExportService;
use procure_api::services::calls::HttpOutboundDialer;
use procure_api::services::inventory::InventoryService;
use procure_api::services::orders::OrderService;
use procure_api::services::purchase_orders::PurchaseOrderGenerator;
use procure_api::services::schedules::ScheduleService;
use procure_api::services::vendor_search::HttpVendorDirectory;
use procure_api::services::vendors::VendorService;
use procure_api::services::workflow::{OrderWorkflowService, TokioPacer, WorkflowSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db).await.map_err(|e| {
            error!("failed running migrations: {}", e);
            e
        })?;
    }
    let db = Arc::new(db);

    let policy = api::models::ReorderPolicy::new(cfg.purchasing.low_stock_band);
    let directory = Arc::new(HttpVendorDirectory::new(&cfg.vendor_search)?);
    let dialer = Arc::new(HttpOutboundDialer::new(cfg.outbound_call.clone()));
    let generator = Arc::new(PurchaseOrderGenerator::new(cfg.purchasing.clone()));
    let workflows = Arc::new(OrderWorkflowService::new(
        directory,
        dialer,
        generator,
        Arc::new(TokioPacer),
        WorkflowSettings::from_config(&cfg.workflow),
    ));

    let services = api::AppServices {
        inventory: Arc::new(InventoryService::new(db.clone(), policy)),
        vendors: Arc::new(VendorService::new(db.clone())),
        schedules: Arc::new(ScheduleService::new(db.clone())),
        orders: Arc::new(OrderService::new(db.clone())),
        workflows,
        calendar: Arc::new(CalendarExportService::new(cfg.calendar.clone())),
    };

    let state = Arc::new(api::AppState {
        db,
        config: cfg.clone(),
        services,
    });

    let app = api::app_router(state);
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!(%addr, "procurement dashboard API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("failed to install shutdown handler: {}", e);
        return;
    }
    info!("shutdown signal received");
}
