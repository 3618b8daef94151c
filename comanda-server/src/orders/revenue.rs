//! Revenue aggregation over persisted orders

use crate::db::{OrderStore, StoreResult, StoredOrder};
use crate::services::MenuCatalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::Order;
use std::sync::Arc;

/// Date-range revenue report
#[derive(Debug, Clone, Serialize)]
pub struct RangeRevenue {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// Revenue aggregator
///
/// Embedded line-item prices are authoritative (they are the snapshot taken
/// at order creation); the live menu is only a fallback for rows persisted
/// without one. A row whose item column fails to decode contributes zero
/// and is logged, never fatal to the aggregate.
#[derive(Clone)]
pub struct RevenueService {
    store: Arc<OrderStore>,
    catalog: Arc<dyn MenuCatalog>,
}

impl RevenueService {
    pub fn new(store: Arc<OrderStore>, catalog: Arc<dyn MenuCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Total revenue across all paid orders
    pub fn total_paid(&self) -> StoreResult<i64> {
        let total = self
            .store
            .snapshot_records()?
            .iter()
            .filter(|r| r.paid)
            .map(|r| self.record_total(r))
            .sum();
        Ok(total)
    }

    /// Orders created inside `[start, end]` regardless of status, with
    /// their combined total
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<RangeRevenue> {
        let mut records: Vec<StoredOrder> = self
            .store
            .snapshot_records()?
            .into_iter()
            .filter(|r| r.created_at >= start && r.created_at <= end)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = records.iter().map(|r| self.record_total(r)).sum();
        let orders = records.into_iter().map(StoredOrder::into_order).collect();
        Ok(RangeRevenue { orders, total })
    }

    fn record_total(&self, record: &StoredOrder) -> i64 {
        match record.decode_items() {
            Ok(items) => items
                .iter()
                .map(|item| item.line_total(self.catalog.unit_price(item.food_id)))
                .sum(),
            Err(e) => {
                tracing::warn!(
                    order_id = %record.id,
                    error = %e,
                    "Unparsable item column, order contributes zero to the total"
                );
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::lifecycle::TransitionContext;
    use crate::services::StaticMenu;
    use chrono::Duration;
    use shared::{LineItem, OrderDraft, OrderKind, OrderStatus};
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: Arc<OrderStore>,
        revenue: RevenueService,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(OrderStore::open(dir.path().join("orders.redb")).unwrap());
        let catalog = Arc::new(StaticMenu::new(HashMap::from([(1, 4000), (2, 1500)])));
        let revenue = RevenueService::new(store.clone(), catalog);
        Fixture {
            _dir: dir,
            store,
            revenue,
        }
    }

    fn paid_order(store: &OrderStore, items: Vec<LineItem>) -> Order {
        let order = store
            .create(OrderDraft {
                kind: OrderKind::Pickup,
                items,
                note: None,
                table_number: None,
            })
            .unwrap();
        store
            .apply_transition(&order.id, OrderStatus::Paid, TransitionContext::default())
            .unwrap()
            .order
    }

    fn raw_record(id: &str, items: &str, paid: bool, created_at: DateTime<Utc>) -> StoredOrder {
        StoredOrder {
            id: id.to_string(),
            kind: OrderKind::Pickup,
            items: items.to_string(),
            note: None,
            table_number: None,
            status: if paid {
                OrderStatus::Paid
            } else {
                OrderStatus::Done
            },
            cancel_reason: None,
            paid,
            created_at,
        }
    }

    #[test]
    fn total_prefers_the_embedded_price_snapshot() {
        let f = fixture();
        // Menu says 4000, the order was placed at 5000; the snapshot wins.
        paid_order(
            &f.store,
            vec![LineItem {
                food_id: 1,
                name: "Burger".to_string(),
                unit_price: Some(5000),
                quantity: 2,
            }],
        );

        assert_eq!(f.revenue.total_paid().unwrap(), 10000);
    }

    #[test]
    fn missing_embedded_price_falls_back_to_the_menu() {
        let f = fixture();
        paid_order(
            &f.store,
            vec![LineItem {
                food_id: 2,
                name: "Fries".to_string(),
                unit_price: None,
                quantity: 3,
            }],
        );

        assert_eq!(f.revenue.total_paid().unwrap(), 4500);
    }

    #[test]
    fn unknown_food_without_price_counts_zero() {
        let f = fixture();
        paid_order(
            &f.store,
            vec![LineItem {
                food_id: 99,
                name: "Mystery".to_string(),
                unit_price: None,
                quantity: 4,
            }],
        );

        assert_eq!(f.revenue.total_paid().unwrap(), 0);
    }

    #[test]
    fn unpaid_orders_do_not_count() {
        let f = fixture();
        f.store
            .create(OrderDraft {
                kind: OrderKind::Pickup,
                items: vec![LineItem {
                    food_id: 1,
                    name: "Burger".to_string(),
                    unit_price: Some(5000),
                    quantity: 1,
                }],
                note: None,
                table_number: None,
            })
            .unwrap();

        assert_eq!(f.revenue.total_paid().unwrap(), 0);
    }

    #[test]
    fn corrupt_item_column_contributes_zero_without_aborting() {
        let f = fixture();
        paid_order(
            &f.store,
            vec![LineItem {
                food_id: 1,
                name: "Burger".to_string(),
                unit_price: Some(5000),
                quantity: 1,
            }],
        );
        f.store
            .insert_record(&raw_record("corrupt", "definitely not json", true, Utc::now()))
            .unwrap();

        assert_eq!(f.revenue.total_paid().unwrap(), 5000);
    }

    #[test]
    fn range_report_spans_statuses_and_respects_bounds() {
        let f = fixture();
        let now = Utc::now();
        let items = r#"[{"foodId":1,"name":"Burger","unitPrice":5000,"quantity":1}]"#;

        f.store
            .insert_record(&raw_record("in-paid", items, true, now - Duration::hours(1)))
            .unwrap();
        f.store
            .insert_record(&raw_record("in-done", items, false, now - Duration::hours(2)))
            .unwrap();
        f.store
            .insert_record(&raw_record("out", items, true, now - Duration::days(2)))
            .unwrap();

        let report = f
            .revenue
            .in_range(now - Duration::days(1), now)
            .unwrap();
        assert_eq!(report.orders.len(), 2);
        assert_eq!(report.total, 10000);
        // Newest first.
        assert_eq!(report.orders[0].id, "in-paid");
        assert_eq!(report.orders[1].id, "in-done");
    }
}
