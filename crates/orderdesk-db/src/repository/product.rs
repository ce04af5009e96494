//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Reorder report (stock at or below the reorder level)
//! - Conditional stock decrement used by order placement
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (lost update under concurrency)             │
//! │     UPDATE products SET current_stock = 7 WHERE id = ?                 │
//! │                                                                         │
//! │  ✅ CORRECT: Guarded delta update                                      │
//! │     UPDATE products SET current_stock = current_stock - 3              │
//! │     WHERE id = ? AND current_stock >= 3                                │
//! │                                                                         │
//! │  0 rows affected ──► stock moved under us ──► placement is retried     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use orderdesk_core::{validation, NewProduct, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.insert(&NewProduct { sku: "WIDGET-01".into(), .. }).await?;
/// let same = repo.get_by_sku("WIDGET-01").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Gets a product by its SKU.
    ///
    /// ## Arguments
    /// * `sku` - Product SKU (e.g., "WIDGET-01")
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, price_cents, current_stock, reorder_level,
                created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, price_cents, current_stock, reorder_level,
                created_at, updated_at
            FROM products
            ORDER BY name, sku
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `new` - Validated before anything touches the database
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id and timestamps
    /// * `Err(DbError::Validation)` - Bad SKU, name, price or stock
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        new.validate()?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku.trim().to_string(),
            name: new.name.trim().to_string(),
            price_cents: new.price_cents,
            current_stock: new.current_stock,
            reorder_level: new.reorder_level,
            created_at: now,
            updated_at: now,
        };

        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price_cents, current_stock, reorder_level,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.current_stock)
        .bind(product.reorder_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &product.sku),
            other => other,
        })?;

        Ok(product)
    }

    /// Updates an existing product.
    ///
    /// Price changes here never touch existing order items; those carry
    /// their own copy of the price.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validation::validate_sku(&product.sku)?;
        validation::validate_name("name", &product.name)?;
        validation::validate_price_cents(product.price_cents)?;
        validation::validate_non_negative("current_stock", product.current_stock)?;
        validation::validate_non_negative("reorder_level", product.reorder_level)?;

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                price_cents = ?4,
                current_stock = ?5,
                reorder_level = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.current_stock)
        .bind(product.reorder_level)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &product.sku),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Order items still reference it
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Products whose stock is at or below their reorder level, lowest stock
    /// first.
    ///
    /// Purely a report; placement never looks at the reorder level.
    pub async fn below_reorder_level(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, price_cents, current_stock, reorder_level,
                created_at, updated_at
            FROM products
            WHERE current_stock <= reorder_level
            ORDER BY current_stock, sku
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

// =============================================================================
// Shared Queries (pool or open transaction)
// =============================================================================

pub(crate) async fn fetch_product<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id, sku, name, price_cents, current_stock, reorder_level,
            created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Removes `amount` units if at least that many are on hand.
///
/// ## Returns
/// Rows affected: 1 on success, 0 when the product is gone or short.
pub(crate) async fn decrement_stock_if_available<'e, E>(
    executor: E,
    id: &str,
    amount: i64,
) -> DbResult<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    debug!(id = %id, amount = %amount, "Decrementing stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            current_stock = current_stock - ?2,
            updated_at = ?3
        WHERE id = ?1 AND current_stock >= ?2
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use orderdesk_core::{NewProduct, ValidationError};

    use super::*;

    fn widget(sku: &str, stock: i64, reorder_level: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Widget {sku}"),
            price_cents: 250,
            current_stock: stock,
            reorder_level,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = setup().await;
        let repo = db.products();

        let created = repo.insert(&widget("WIDGET-01", 10, 2)).await.unwrap();
        assert_eq!(created.current_stock, 10);

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        let by_sku = repo.get_by_sku("WIDGET-01").await.unwrap().unwrap();
        assert_eq!(by_id, by_sku);
        assert_eq!(by_id.price_cents, 250);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(&widget("WIDGET-01", 1, 0)).await.unwrap();
        let err = repo.insert(&widget("WIDGET-01", 1, 0)).await.unwrap_err();

        assert!(
            matches!(err, DbError::UniqueViolation { ref field, ref value } if field == "sku" && value == "WIDGET-01")
        );
    }

    #[tokio::test]
    async fn test_invalid_product_never_reaches_sql() {
        let db = setup().await;

        let err = db.products().insert(&widget("WIDGET-01", -1, 0)).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Negative { .. })
        ));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = setup().await;
        let repo = db.products();

        let mut product = repo.insert(&widget("WIDGET-01", 10, 2)).await.unwrap();
        product.price_cents = 300;
        product.name = "Widget Deluxe".to_string();
        repo.update(&product).await.unwrap();

        let reloaded = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price_cents, 300);
        assert_eq!(reloaded.name, "Widget Deluxe");

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&product.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_below_reorder_level() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(&widget("PLENTY", 50, 5)).await.unwrap();
        repo.insert(&widget("LOW", 3, 5)).await.unwrap();
        repo.insert(&widget("EMPTY", 0, 1)).await.unwrap();

        let low: Vec<String> = repo
            .below_reorder_level(10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();

        assert_eq!(low, vec!["EMPTY".to_string(), "LOW".to_string()]);
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let db = setup().await;
        let product = db.products().insert(&widget("WIDGET-01", 5, 0)).await.unwrap();

        assert_eq!(
            decrement_stock_if_available(db.pool(), &product.id, 3)
                .await
                .unwrap(),
            1
        );
        // Only 2 left
        assert_eq!(
            decrement_stock_if_available(db.pool(), &product.id, 3)
                .await
                .unwrap(),
            0
        );

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_stock, 2);
    }
}
