use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::entities::inventory_items;

/// Restock urgency derived from current stock vs reorder point. Never
/// persisted; recomputed on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Good,
    Low,
    Reorder,
}

/// Classification policy for stock levels.
///
/// `low_band` widens the Low band above the reorder point: stock at or
/// below `reorder_point * low_band` (but above the reorder point itself)
/// counts as Low. The multiplier is policy configuration, not a constant.
#[derive(Clone, Copy, Debug)]
pub struct ReorderPolicy {
    pub low_band: Decimal,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self { low_band: dec!(1.2) }
    }
}

impl ReorderPolicy {
    pub fn new(low_band: Decimal) -> Self {
        Self { low_band }
    }

    /// Classifies a stock level. Pure; thresholding is multiplication-based
    /// so a zero reorder point never divides by zero.
    pub fn classify(&self, current_stock: i32, reorder_point: i32) -> StockStatus {
        if current_stock <= reorder_point {
            return StockStatus::Reorder;
        }
        if Decimal::from(current_stock) <= Decimal::from(reorder_point) * self.low_band {
            return StockStatus::Low;
        }
        StockStatus::Good
    }

    /// Default quantity to order when an item is due for replenishment.
    pub fn suggested_quantity(&self, item: &inventory_items::Model) -> i32 {
        item.reorder_quantity
    }
}
