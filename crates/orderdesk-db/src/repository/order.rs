//! # Order Repository
//!
//! Read side of the order ledger, plus the inserts the placement unit runs
//! inside its transaction.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders (header)                 order_items (append-only)             │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │ id                   │◄───────│ order_id, line_number (0,1,2..)  │  │
//! │  │ customer_id          │        │ product_id, quantity             │  │
//! │  │ status = PENDING     │        │ unit_price_cents ← copied value  │  │
//! │  │ created_at           │        └──────────────────────────────────┘  │
//! │  └──────────────────────┘                                              │
//! │                                                                         │
//! │  There is no update or delete here: triggers reject both once rows     │
//! │  are committed.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use orderdesk_core::{Order, OrderItem, OrderView};

/// Read-only queries over placed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its items in creation order.
    ///
    /// ## Returns
    /// * `Ok(Some(OrderView))` - Order found
    /// * `Ok(None)` - No such order
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderView>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => {
                let items = self.items(&order.id).await?;
                Ok(Some(OrderView::new(order, items)))
            }
            None => Ok(None),
        }
    }

    /// Items of one order, ordered by line number.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, line_number, product_id, quantity, unit_price_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// All orders of a customer, oldest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<OrderView>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, status, created_at
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(customer_id = %customer_id, count = orders.len(), "Loaded customer orders");

        self.with_items(orders).await
    }

    /// Most recent orders first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<OrderView>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, status, created_at
            FROM orders
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// Counts committed orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn with_items(&self, orders: Vec<Order>) -> DbResult<Vec<OrderView>> {
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items(&order.id).await?;
            views.push(OrderView::new(order, items));
        }
        Ok(views)
    }
}

// =============================================================================
// Ledger Inserts (run inside the placement transaction)
// =============================================================================

pub(crate) async fn insert_order<'e, E>(executor: E, order: &Order) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    debug!(id = %order.id, customer_id = %order.customer_id, "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (id, customer_id, status, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_order_item<'e, E>(executor: E, item: &OrderItem) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    debug!(
        order_id = %item.order_id,
        line = item.line_number,
        product_id = %item.product_id,
        "Inserting order item"
    );

    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, line_number, product_id, quantity, unit_price_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(item.line_number)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .execute(executor)
    .await?;

    Ok(())
}
