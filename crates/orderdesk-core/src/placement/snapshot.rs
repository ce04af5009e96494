//! # Stock Snapshot
//!
//! The validation pass of a placement. Products are read once into memory and
//! every line reserves against that copy, so nothing is written until the
//! whole request is known to fit.
//!
//! ```text
//! request: [A×3, B×1, A×3]        snapshot: A stock=5, B stock=9
//!
//!   line 0  A×3   reserved A = 3  ≤ 5  ✓
//!   line 1  B×1   reserved B = 1  ≤ 9  ✓
//!   line 2  A×3   reserved A = 6  > 5  ✗ InsufficientStock { available: 5, requested: 6 }
//! ```

use std::collections::HashMap;

use crate::error::{PlacementError, PlacementResult};
use crate::money::Money;
use crate::types::Product;

/// A validated line, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: String,
    pub quantity: i64,
    /// Price copied from the snapshot product.
    pub unit_price: Money,
}

/// Products read during validation plus what the request has reserved so far.
#[derive(Debug, Default)]
pub struct StockSnapshot {
    products: HashMap<String, Product>,
    reserved: HashMap<String, i64>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        StockSnapshot::default()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.contains_key(product_id)
    }

    /// Records a product as read from the store. The first read wins.
    pub fn insert(&mut self, product: Product) {
        self.products.entry(product.id.clone()).or_insert(product);
    }

    /// Units already reserved for a product by earlier lines.
    pub fn reserved(&self, product_id: &str) -> i64 {
        self.reserved.get(product_id).copied().unwrap_or(0)
    }

    /// Reserves `quantity` units of an already-loaded product.
    ///
    /// The check is cumulative: earlier lines for the same product count
    /// against the same stock.
    pub fn reserve(&mut self, product_id: &str, quantity: i64) -> PlacementResult<PlannedLine> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| PlacementError::ProductNotFound(product_id.to_string()))?;

        // Saturates: a sum past i64::MAX can never be covered anyway.
        let requested = self.reserved(product_id).saturating_add(quantity);
        if !product.has_stock_for(requested) {
            return Err(PlacementError::InsufficientStock {
                product_id: product.id.clone(),
                sku: product.sku.clone(),
                available: product.current_stock,
                requested,
            });
        }

        let line = PlannedLine {
            product_id: product.id.clone(),
            quantity,
            unit_price: product.price(),
        };
        self.reserved.insert(product_id.to_string(), requested);
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, stock: i64, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            name: id.to_string(),
            price_cents,
            current_stock: stock,
            reorder_level: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reserve_within_stock() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(product("a", 10, 250));

        let line = snapshot.reserve("a", 4).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.unit_price, Money::from_cents(250));
        assert_eq!(snapshot.reserved("a"), 4);
    }

    #[test]
    fn test_reserve_is_cumulative() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(product("a", 5, 100));

        snapshot.reserve("a", 3).unwrap();
        let err = snapshot.reserve("a", 3).unwrap_err();

        match err {
            PlacementError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // A failed reservation leaves the earlier one untouched.
        assert_eq!(snapshot.reserved("a"), 3);
    }

    #[test]
    fn test_exact_stock_is_enough() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(product("a", 5, 100));

        snapshot.reserve("a", 2).unwrap();
        snapshot.reserve("a", 3).unwrap();
        assert_eq!(snapshot.reserved("a"), 5);
    }

    #[test]
    fn test_huge_duplicate_line_is_insufficient_stock() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(product("a", 5, 100));

        snapshot.reserve("a", 3).unwrap();
        let err = snapshot.reserve("a", i64::MAX).unwrap_err();

        assert!(matches!(
            err,
            PlacementError::InsufficientStock { available: 5, requested: i64::MAX, .. }
        ));
        assert_eq!(snapshot.reserved("a"), 3);
    }

    #[test]
    fn test_first_read_wins() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(product("a", 5, 100));
        snapshot.insert(product("a", 50, 999));

        let line = snapshot.reserve("a", 5).unwrap();
        assert_eq!(line.unit_price.cents(), 100);
        assert!(snapshot.reserve("a", 1).is_err());
    }

    #[test]
    fn test_unknown_product() {
        let mut snapshot = StockSnapshot::new();
        assert!(matches!(
            snapshot.reserve("ghost", 1),
            Err(PlacementError::ProductNotFound(id)) if id == "ghost"
        ));
    }
}
