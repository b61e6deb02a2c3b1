pub mod inventory_items;
pub mod restock_orders;
pub mod restock_schedules;
pub mod vendors;
