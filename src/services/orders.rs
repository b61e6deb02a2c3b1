use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{inventory_items, restock_orders, vendors};
use crate::errors::ServiceError;

/// Terminal statuses excluded from the active-orders dashboard table.
const CLOSED_STATUSES: [&str; 2] = ["delivered", "cancelled"];

#[derive(Clone, Debug, Serialize)]
pub struct RestockOrderView {
    pub id: Uuid,
    pub item_name: Option<String>,
    pub vendor_name: Option<String>,
    pub quantity: i32,
    pub unit: Option<String>,
    pub status: String,
    pub order_date: DateTime<Utc>,
}

/// Read side for restock orders (the dashboard "active orders" table).
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Open restock orders, newest first, with item and vendor resolved.
    #[instrument(skip(self))]
    pub async fn list_active_orders(&self) -> Result<Vec<RestockOrderView>, ServiceError> {
        let rows = restock_orders::Entity::find()
            .filter(restock_orders::Column::Status.is_not_in(CLOSED_STATUSES))
            .order_by_desc(restock_orders::Column::OrderDate)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let item_ids: Vec<Uuid> = rows.iter().map(|o| o.inventory_item_id).collect();
        let items: HashMap<Uuid, inventory_items::Model> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(item_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let vendor_ids: Vec<Uuid> = rows.iter().filter_map(|o| o.vendor_id).collect();
        let vendor_rows: HashMap<Uuid, vendors::Model> = vendors::Entity::find()
            .filter(vendors::Column::Id.is_in(vendor_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        Ok(rows
            .into_iter()
            .map(|o| {
                let item = items.get(&o.inventory_item_id);
                RestockOrderView {
                    id: o.id,
                    item_name: item.map(|i| i.name.clone()),
                    vendor_name: o
                        .vendor_id
                        .and_then(|vid| vendor_rows.get(&vid))
                        .map(|v| v.name.clone()),
                    quantity: o.quantity,
                    unit: item.map(|i| i.unit.clone()),
                    status: o.status,
                    order_date: o.order_date,
                }
            })
            .collect())
    }
}
