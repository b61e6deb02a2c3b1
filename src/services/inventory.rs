use sea_orm::{EntityTrait, PaginatorTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{inventory_items, vendors};
use crate::errors::ServiceError;
use crate::models::{ReorderPolicy, StockStatus};

/// Inventory item with resolved vendor name and computed stock status, as
/// rendered by the dashboard table.
#[derive(Clone, Debug, Serialize)]
pub struct InventoryItemView {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub current_stock: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub unit: String,
    pub vendor_name: Option<String>,
    pub status: StockStatus,
}

/// Read-only view over inventory. Stock is mutated by restock fulfillment
/// outside this service.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    policy: ReorderPolicy,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, policy: ReorderPolicy) -> Self {
        Self { db, policy }
    }

    /// Lists inventory items with pagination. Pages are 1-based.
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<InventoryItemView>, u64), ServiceError> {
        let paginator = inventory_items::Entity::find()
            .find_also_related(vendors::Entity)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "failed to count inventory items");
            ServiceError::DatabaseError(e)
        })?;

        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| {
                error!(page, per_page, error = %e, "failed to fetch inventory page");
                ServiceError::DatabaseError(e)
            })?;

        let items = rows
            .into_iter()
            .map(|(item, vendor)| self.view(item, vendor))
            .collect();
        Ok((items, total))
    }

    /// Fetches a single item by id.
    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<InventoryItemView, ServiceError> {
        let row = inventory_items::Entity::find_by_id(id)
            .find_also_related(vendors::Entity)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        match row {
            Some((item, vendor)) => Ok(self.view(item, vendor)),
            None => Err(ServiceError::NotFound(format!(
                "inventory item {} not found",
                id
            ))),
        }
    }

    fn view(
        &self,
        item: inventory_items::Model,
        vendor: Option<vendors::Model>,
    ) -> InventoryItemView {
        let status = self.policy.classify(item.current_stock, item.reorder_point);
        InventoryItemView {
            id: item.id,
            name: item.name,
            sku: item.sku,
            current_stock: item.current_stock,
            reorder_point: item.reorder_point,
            reorder_quantity: item.reorder_quantity,
            unit: item.unit,
            vendor_name: vendor.map(|v| v.name),
            status,
        }
    }
}
