use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor details frozen into a purchase order at issue time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSnapshot {
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub description: String,
    pub model: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A generated purchase-order document. A value object: nothing here is
/// persisted, and totals are fixed-point with 2 decimal places.
///
/// Invariants: `line_total = quantity * unit_price`,
/// `subtotal = sum(line_total)`, `grand_total = subtotal + tax + shipping`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub po_number: String,
    pub issue_date: NaiveDate,
    pub vendor: VendorSnapshot,
    pub lines: Vec<PurchaseOrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub grand_total: Decimal,
    pub payment_terms: String,
    pub expected_delivery_date: NaiveDate,
}

impl PurchaseOrder {
    /// Checks the arithmetic invariants. Used by tests; generation upholds
    /// them by construction.
    pub fn totals_consistent(&self) -> bool {
        let subtotal: Decimal = self.lines.iter().map(|l| l.line_total).sum();
        self.lines
            .iter()
            .all(|l| l.line_total == Decimal::from(l.quantity) * l.unit_price)
            && self.subtotal == subtotal
            && self.grand_total == self.subtotal + self.tax + self.shipping
    }
}
