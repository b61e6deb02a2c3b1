//! Property-based tests for the reorder policy, schedule selector, and
//! purchase-order arithmetic.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use procure_api::config::PurchasingConfig;
use procure_api::entities::restock_schedules;
use procure_api::models::{ReorderPolicy, StockStatus, VendorCandidate};
use procure_api::services::purchase_orders::PurchaseOrderGenerator;
use procure_api::services::schedules::{dues_in_range, dues_on};
use uuid::Uuid;

fn money_strategy() -> impl Strategy<Value = Decimal> {
    // amounts in cents, up to $10,000.00
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // With the default 1.2 band the three classes partition the domain:
    // Reorder iff stock <= point, Low iff point < stock and 5*stock <= 6*point,
    // Good otherwise. Both boundaries are closed toward the lower class.
    #[test]
    fn classify_partitions_the_domain(
        current in 0i32..100_000,
        reorder in 0i32..100_000,
    ) {
        let status = ReorderPolicy::default().classify(current, reorder);
        let expected = if current <= reorder {
            StockStatus::Reorder
        } else if 5 * (current as i64) <= 6 * (reorder as i64) {
            StockStatus::Low
        } else {
            StockStatus::Good
        };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn boundaries_are_closed_toward_lower_class(reorder in 1i32..100_000) {
        let policy = ReorderPolicy::default();
        prop_assert_eq!(policy.classify(reorder, reorder), StockStatus::Reorder);
        // the first value above the reorder point is never Reorder
        prop_assert_ne!(policy.classify(reorder + 1, reorder), StockStatus::Reorder);
    }
}

fn schedule_strategy() -> impl Strategy<Value = restock_schedules::Model> {
    (0i64..120, 0u32..24, any::<bool>(), any::<bool>()).prop_map(
        |(day_offset, hour, has_next, active)| {
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            restock_schedules::Model {
                id: Uuid::new_v4(),
                inventory_item_id: Uuid::new_v4(),
                frequency_days: 14,
                last_check_date: None,
                next_check_date: has_next
                    .then(|| base + chrono::Duration::days(day_offset) + chrono::Duration::hours(hour as i64)),
                active,
                created_at: base,
            }
        },
    )
}

proptest! {
    #[test]
    fn dues_on_agrees_with_one_day_range(
        schedules in prop::collection::vec(schedule_strategy(), 0..40),
        day_offset in 0i64..120,
    ) {
        let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::days(day_offset);
        let next = target.succ_opt().unwrap();
        prop_assert_eq!(
            dues_on(&schedules, target),
            dues_in_range(&schedules, target, next)
        );
    }

    #[test]
    fn inactive_schedules_never_selected(
        schedules in prop::collection::vec(schedule_strategy(), 0..40),
        day_offset in 0i64..120,
    ) {
        let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::days(day_offset);
        prop_assert!(dues_on(&schedules, target).iter().all(|s| s.active));
        prop_assert!(
            dues_in_range(&schedules, target, target + chrono::Duration::days(30))
                .iter()
                .all(|s| s.active)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn purchase_order_totals_always_consistent(
        quantity in 1u32..5_000,
        unit_price in money_strategy(),
        shipping in money_strategy(),
        tax_cents in 0i64..30,
        query in "[a-z ]{1,40}",
    ) {
        let cfg = PurchasingConfig {
            default_quantity: quantity,
            default_unit_price: unit_price,
            shipping_flat: shipping,
            tax_rate: Decimal::new(tax_cents, 2),
            ..Default::default()
        };
        let generator = PurchaseOrderGenerator::new(cfg);
        let po = generator.generate(&VendorCandidate::named("Vendor"), &query);
        prop_assert!(po.totals_consistent());
        prop_assert_eq!(po.lines.len(), 1);
    }
}
