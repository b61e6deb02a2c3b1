pub mod purchase_order;
pub mod stock;
pub mod vendor;

pub use purchase_order::{PurchaseOrder, PurchaseOrderLine, VendorSnapshot};
pub use stock::{ReorderPolicy, StockStatus};
pub use vendor::VendorCandidate;
