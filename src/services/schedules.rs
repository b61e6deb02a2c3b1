use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{inventory_items, restock_schedules, vendors};
use crate::errors::ServiceError;

/// Active schedules whose next check falls on `target`. Comparison is
/// date-only: rows carry timestamps, the target is a bare calendar date,
/// so both sides are normalized before comparing. Stable input order.
pub fn dues_on(
    schedules: &[restock_schedules::Model],
    target: NaiveDate,
) -> Vec<restock_schedules::Model> {
    schedules
        .iter()
        .filter(|s| s.active)
        .filter(|s| s.next_check_date.map(check_date) == Some(target))
        .cloned()
        .collect()
}

/// Half-open interval variant for calendar views: active schedules whose
/// next check date lies in `[start, end_exclusive)`. Agrees with `dues_on`
/// for a one-day range.
pub fn dues_in_range(
    schedules: &[restock_schedules::Model],
    start: NaiveDate,
    end_exclusive: NaiveDate,
) -> Vec<restock_schedules::Model> {
    schedules
        .iter()
        .filter(|s| s.active)
        .filter(|s| {
            s.next_check_date
                .map(check_date)
                .is_some_and(|d| d >= start && d < end_exclusive)
        })
        .cloned()
        .collect()
}

fn check_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Inventory item details resolved onto a schedule row.
#[derive(Clone, Debug, Serialize)]
pub struct ScheduleItemView {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub vendor_name: Option<String>,
    pub vendor_phone: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScheduleView {
    pub id: Uuid,
    pub frequency_days: i32,
    pub last_check_date: Option<DateTime<Utc>>,
    pub next_check_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub item: Option<ScheduleItemView>,
}

/// Read side for restock schedules, resolving the owning item and vendor.
#[derive(Clone)]
pub struct ScheduleService {
    db: Arc<DbPool>,
}

impl ScheduleService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// All schedules with resolved item and vendor, in storage order.
    #[instrument(skip(self))]
    pub async fn list_schedules(&self) -> Result<Vec<ScheduleView>, ServiceError> {
        let rows = restock_schedules::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        self.resolve(rows).await
    }

    /// Schedules due on exactly `date`.
    #[instrument(skip(self))]
    pub async fn due_on(&self, date: NaiveDate) -> Result<Vec<ScheduleView>, ServiceError> {
        let rows = restock_schedules::Entity::find()
            .filter(restock_schedules::Column::Active.eq(true))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        self.resolve(dues_on(&rows, date)).await
    }

    /// Schedules due within `[start, end_exclusive)`.
    #[instrument(skip(self))]
    pub async fn due_in_range(
        &self,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<ScheduleView>, ServiceError> {
        if start >= end_exclusive {
            return Err(ServiceError::InvalidInput(
                "start date must precede end date".to_string(),
            ));
        }
        let rows = restock_schedules::Entity::find()
            .filter(restock_schedules::Column::Active.eq(true))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        self.resolve(dues_in_range(&rows, start, end_exclusive)).await
    }

    async fn resolve(
        &self,
        rows: Vec<restock_schedules::Model>,
    ) -> Result<Vec<ScheduleView>, ServiceError> {
        let item_ids: Vec<Uuid> = rows.iter().map(|s| s.inventory_item_id).collect();
        let items: HashMap<Uuid, inventory_items::Model> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(item_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let vendor_ids: Vec<Uuid> = items.values().filter_map(|i| i.vendor_id).collect();
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
            .map(|s| {
                let item = items.get(&s.inventory_item_id).map(|i| {
                    let vendor = i.vendor_id.and_then(|vid| vendor_rows.get(&vid));
                    ScheduleItemView {
                        id: i.id,
                        name: i.name.clone(),
                        unit: i.unit.clone(),
                        current_stock: i.current_stock,
                        reorder_point: i.reorder_point,
                        reorder_quantity: i.reorder_quantity,
                        vendor_name: vendor.map(|v| v.name.clone()),
                        vendor_phone: vendor.and_then(|v| v.phone.clone()),
                    }
                });
                ScheduleView {
                    id: s.id,
                    frequency_days: s.frequency_days,
                    last_check_date: s.last_check_date,
                    next_check_date: s.next_check_date,
                    active: s.active,
                    item,
                }
            })
            .collect())
    }
}
