use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub current_stock: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub unit: String,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::restock_schedules::Entity")]
    RestockSchedules,
    #[sea_orm(has_many = "super::restock_orders::Entity")]
    RestockOrders,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::restock_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestockSchedules.def()
    }
}

impl Related<super::restock_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestockOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
