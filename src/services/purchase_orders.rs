use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PurchasingConfig;
use crate::models::{PurchaseOrder, PurchaseOrderLine, VendorCandidate, VendorSnapshot};

/// Produces purchase-order documents for a selected vendor. Deterministic
/// apart from the order-number suffix: a monotonic counter seeded randomly
/// at construction, which keeps numbers unique within a session without
/// any global coordination.
pub struct PurchaseOrderGenerator {
    config: PurchasingConfig,
    sequence: AtomicU64,
}

impl PurchaseOrderGenerator {
    pub fn new(config: PurchasingConfig) -> Self {
        let seed = rand::thread_rng().gen_range(1000..9000);
        Self {
            config,
            sequence: AtomicU64::new(seed),
        }
    }

    pub fn generate(&self, vendor: &VendorCandidate, query: &str) -> PurchaseOrder {
        let issue_date = Utc::now().date_naive();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let po_number = format!("PO-{}-{}", issue_date.format("%Y%m%d"), seq);

        let quantity = self.config.default_quantity;
        let unit_price = self.config.default_unit_price;
        let line = PurchaseOrderLine {
            description: query.trim().to_string(),
            model: None,
            quantity,
            unit_price,
            line_total: Decimal::from(quantity) * unit_price,
        };

        let subtotal: Decimal = line.line_total;
        let tax = (subtotal * self.config.tax_rate).round_dp(2);
        let shipping = self.config.shipping_flat;

        PurchaseOrder {
            po_number,
            issue_date,
            vendor: VendorSnapshot {
                name: vendor.name.clone(),
                address: vendor.website.clone(),
                email: vendor.email.clone(),
                phone: vendor.phone.clone(),
            },
            lines: vec![line],
            subtotal,
            tax,
            shipping,
            grand_total: subtotal + tax + shipping,
            payment_terms: self.config.payment_terms.clone(),
            expected_delivery_date: issue_date + Duration::days(self.config.lead_time_days),
        }
    }
}
