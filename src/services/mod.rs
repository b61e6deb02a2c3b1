pub mod calendar;
pub mod calls;
pub mod inventory;
pub mod orders;
pub mod purchase_orders;
pub mod schedules;
pub mod vendor_search;
pub mod vendors;
pub mod workflow;
