//! # SQLite Placement Store
//!
//! Backs the core [`OrderPlacementEngine`](orderdesk_core::OrderPlacementEngine)
//! with one SQLite transaction per placement attempt.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                        ← write lock up front           │
//! │    SELECT customers / products          ← validation reads              │
//! │    INSERT orders                                                        │
//! │    UPDATE products ... WHERE current_stock >= ?   ← per line            │
//! │    INSERT order_items (line_number 0, 1, ...)     ← per line            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  any error ──► ROLLBACK (explicit, or on drop of the transaction)       │
//! │                                                                         │
//! │  busy_timeout exceeded / guarded UPDATE hit 0 rows                      │
//! │      ──► StoreError::Conflict ──► engine re-runs the whole placement    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use orderdesk_core::placement::{InventoryStore, OrderLedger};
use orderdesk_core::{
    Customer, Money, Order, OrderItem, OrderStatus, PlacementStore, PlacementUnit, Product,
    StoreError,
};

use crate::error::DbError;
use crate::repository::{customer, order, product};

/// Opens a [`SqlitePlacementUnit`] per placement attempt.
#[derive(Debug, Clone)]
pub struct SqlitePlacementStore {
    pool: SqlitePool,
}

impl SqlitePlacementStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqlitePlacementStore { pool }
    }
}

#[async_trait]
impl PlacementStore for SqlitePlacementStore {
    type Unit = SqlitePlacementUnit;

    /// Opens the unit with `BEGIN IMMEDIATE`, taking the write lock before
    /// the first read. Competing placements wait in SQLite's busy handler
    /// and then validate against the committed stock.
    async fn begin(&self) -> Result<Self::Unit, StoreError> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        Ok(SqlitePlacementUnit {
            tx,
            next_line: HashMap::new(),
        })
    }
}

/// One open transaction. Dropping it without `commit` rolls back.
pub struct SqlitePlacementUnit {
    tx: Transaction<'static, Sqlite>,
    /// Next line number per order created in this unit.
    next_line: HashMap<String, i64>,
}

#[async_trait]
impl InventoryStore for SqlitePlacementUnit {
    async fn get_product(&mut self, product_id: &str) -> Result<Option<Product>, StoreError> {
        Ok(product::fetch_product(&mut *self.tx, product_id).await?)
    }

    async fn decrement_stock(&mut self, product_id: &str, amount: i64) -> Result<(), StoreError> {
        let updated =
            product::decrement_stock_if_available(&mut *self.tx, product_id, amount).await?;

        if updated == 0 {
            return Err(DbError::Conflict(format!(
                "stock for product {product_id} changed before decrement of {amount}"
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl OrderLedger for SqlitePlacementUnit {
    async fn create_order(
        &mut self,
        customer_id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            status,
            created_at: Utc::now(),
        };

        order::insert_order(&mut *self.tx, &order).await?;
        self.next_line.insert(order.id.clone(), 0);

        Ok(order)
    }

    async fn create_order_item(
        &mut self,
        order_id: &str,
        product_id: &str,
        quantity: i64,
        unit_price: Money,
    ) -> Result<OrderItem, StoreError> {
        let next = self.next_line.entry(order_id.to_string()).or_insert(0);
        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            line_number: *next,
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents: unit_price.cents(),
        };
        *next += 1;

        order::insert_order_item(&mut *self.tx, &item).await?;

        Ok(item)
    }
}

#[async_trait]
impl PlacementUnit for SqlitePlacementUnit {
    async fn get_customer(&mut self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        Ok(customer::fetch_customer(&mut *self.tx, customer_id).await?)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(DbError::from)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use orderdesk_core::{NewCustomer, NewProduct, PlaceOrderRequest, PlacementError};

    use crate::pool::{Database, DbConfig};

    use super::*;

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Alice Example".to_string(),
                email: "alice@example.com".to_string(),
                address: None,
            })
            .await
            .unwrap();
        (db, customer.id)
    }

    async fn product(db: &Database, sku: &str, price_cents: i64, stock: i64) -> String {
        db.products()
            .insert(&NewProduct {
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                price_cents,
                current_stock: stock,
                reorder_level: 0,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock(db: &Database, id: &str) -> i64 {
        db.products()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .current_stock
    }

    #[tokio::test]
    async fn test_place_order_commits_everything() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;

        let view = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 4))
            .await
            .unwrap();

        assert_eq!(view.customer_id, customer_id);
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 4);
        assert_eq!(view.items[0].unit_price_cents, 250);
        assert_eq!(view.total().cents(), 1000);
        assert_eq!(stock(&db, &widget).await, 6);

        let stored = db.orders().get_by_id(&view.id).await.unwrap().unwrap();
        assert_eq!(stored.customer_id, view.customer_id);
        assert_eq!(stored.items, view.items);
    }

    #[tokio::test]
    async fn test_items_keep_request_order() {
        let (db, customer_id) = setup().await;
        let a = product(&db, "A", 100, 10).await;
        let b = product(&db, "B", 200, 10).await;

        let view = db
            .place_order(
                &PlaceOrderRequest::new(&customer_id)
                    .line(&b, 1)
                    .line(&a, 2)
                    .line(&b, 3),
            )
            .await
            .unwrap();

        let stored = db.orders().items(&view.id).await.unwrap();
        let lines: Vec<(i64, &str, i64)> = stored
            .iter()
            .map(|i| (i.line_number, i.product_id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, vec![(0, b.as_str(), 1), (1, a.as_str(), 2), (2, b.as_str(), 3)]);
        assert_eq!(stock(&db, &b).await, 6);
    }

    #[tokio::test]
    async fn test_insufficient_stock_persists_nothing() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 3).await;

        let err = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlacementError::InsufficientStock { available: 3, requested: 5, .. }
        ));
        assert_eq!(stock(&db, &widget).await, 3);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_and_empty_order() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 3).await;

        let err = db
            .place_order(&PlaceOrderRequest::new("no-such-customer").line(&widget, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementError::CustomerNotFound(ref id) if id == "no-such-customer"));

        let err = db
            .place_order(&PlaceOrderRequest::new(&customer_id))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementError::EmptyOrder));

        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_after_valid_line_rolls_back() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;

        let err = db
            .place_order(
                &PlaceOrderRequest::new(&customer_id)
                    .line(&widget, 2)
                    .line("no-such-product", 1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PlacementError::ProductNotFound(ref id) if id == "no-such-product"));
        assert_eq!(stock(&db, &widget).await, 10);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_mid_apply_rolls_back() {
        let (db, customer_id) = setup().await;
        let a = product(&db, "A", 100, 10).await;
        let b = product(&db, "B", 200, 10).await;

        // Fail the second item insert, after line one is fully applied.
        sqlx::query(&format!(
            "CREATE TRIGGER fail_item_b BEFORE INSERT ON order_items \
             WHEN NEW.product_id = '{b}' \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END"
        ))
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&a, 2).line(&b, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlacementError::PersistenceFailure(StoreError::Backend(_))
        ));
        assert_eq!(stock(&db, &a).await, 10);
        assert_eq!(stock(&db, &b).await, 10);
        assert_eq!(db.orders().count().await.unwrap(), 0);
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_price_change_does_not_rewrite_history() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;

        let view = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 2))
            .await
            .unwrap();

        let mut repriced = db.products().get_by_id(&widget).await.unwrap().unwrap();
        repriced.price_cents = 999;
        db.products().update(&repriced).await.unwrap();

        let stored = db.orders().get_by_id(&view.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].unit_price_cents, 250);
        assert_eq!(stored.total().cents(), 500);
    }

    #[tokio::test]
    async fn test_committed_ledger_is_append_only() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;
        let view = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 1))
            .await
            .unwrap();

        assert!(sqlx::query("UPDATE order_items SET quantity = 99")
            .execute(db.pool())
            .await
            .is_err());
        assert!(sqlx::query("DELETE FROM order_items")
            .execute(db.pool())
            .await
            .is_err());
        assert!(sqlx::query("DELETE FROM orders")
            .execute(db.pool())
            .await
            .is_err());

        // Referenced rows can't be deleted either.
        assert!(matches!(
            db.products().delete(&widget).await.unwrap_err(),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(db.orders().get_by_id(&view.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_customer_order_listing() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 100, 10).await;

        let first = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 1))
            .await
            .unwrap();
        let second = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 2))
            .await
            .unwrap();

        let mine = db.orders().list_for_customer(&customer_id).await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        let recent = db.orders().list(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, second.id);
        assert!(db
            .orders()
            .list_for_customer("someone-else")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_closed_pool_is_persistence_failure() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;
        db.close().await;

        let err = db
            .place_order(&PlaceOrderRequest::new(&customer_id).line(&widget, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlacementError::PersistenceFailure(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let (db, customer_id) = setup().await;
        let widget = product(&db, "WIDGET-01", 250, 10).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let request = PlaceOrderRequest::new(&customer_id).line(&widget, 3);
            handles.push(tokio::spawn(async move { db.place_order(&request).await }));
        }

        let mut placed = 0;
        let mut short = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => placed += 1,
                Err(PlacementError::InsufficientStock { .. }) => short += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(placed, 3);
        assert_eq!(short, 5);
        assert_eq!(stock(&db, &widget).await, 1);
        assert_eq!(db.orders().count().await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_on_file_database() {
        let path = std::env::temp_dir().join(format!("orderdesk-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();

        let customer_id = db
            .customers()
            .insert(&NewCustomer {
                name: "Bob Example".to_string(),
                email: "bob@example.com".to_string(),
                address: None,
            })
            .await
            .unwrap()
            .id;

        for round in 0..5 {
            let widget = product(&db, &format!("WIDGET-{round:02}"), 250, 10).await;

            let mut handles = Vec::new();
            for _ in 0..6 {
                let db = db.clone();
                let request = PlaceOrderRequest::new(&customer_id).line(&widget, 3);
                handles.push(tokio::spawn(async move { db.place_order(&request).await }));
            }

            let mut placed = 0;
            let mut short = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => placed += 1,
                    Err(PlacementError::InsufficientStock { .. }) => short += 1,
                    Err(other) => panic!("round {round}: unexpected error: {other}"),
                }
            }

            assert_eq!(placed, 3, "round {round}");
            assert_eq!(short, 3, "round {round}");
            assert_eq!(stock(&db, &widget).await, 1, "round {round}");
        }
        assert_eq!(db.orders().count().await.unwrap(), 15);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
