//! # Store Traits
//!
//! The seams between the placement engine and persistence.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PlacementStore ── begin() ──► PlacementUnit (one isolated transaction) │
//! │                                  │                                      │
//! │                                  ├── InventoryStore                     │
//! │                                  │     get_product / decrement_stock    │
//! │                                  ├── OrderLedger                        │
//! │                                  │     create_order / create_order_item │
//! │                                  ├── get_customer                       │
//! │                                  └── commit(self) | rollback(self)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything a unit does becomes visible at `commit` or not at all. Dropping
//! a unit without committing must behave like `rollback`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::money::Money;
use crate::types::{Customer, Order, OrderItem, OrderStatus, Product};

/// Per-product stock counters.
#[async_trait]
pub trait InventoryStore: Send {
    /// Reads a product as seen by this unit of work.
    async fn get_product(&mut self, product_id: &str) -> Result<Option<Product>, StoreError>;

    /// Removes `amount` units from the product's stock.
    ///
    /// Implementations must refuse to take stock below zero. A refusal means
    /// the stock moved under the unit and is reported as
    /// [`StoreError::Conflict`].
    async fn decrement_stock(&mut self, product_id: &str, amount: i64) -> Result<(), StoreError>;
}

/// Orders and their line items.
#[async_trait]
pub trait OrderLedger: Send {
    async fn create_order(
        &mut self,
        customer_id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError>;

    /// Appends the next line to `order_id`. Line numbers are assigned in call
    /// order starting at 0.
    async fn create_order_item(
        &mut self,
        order_id: &str,
        product_id: &str,
        quantity: i64,
        unit_price: Money,
    ) -> Result<OrderItem, StoreError>;
}

/// One isolated, all-or-nothing unit of work.
#[async_trait]
pub trait PlacementUnit: InventoryStore + OrderLedger {
    async fn get_customer(&mut self, customer_id: &str) -> Result<Option<Customer>, StoreError>;

    /// Makes every write of this unit visible atomically.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards every write of this unit.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Opens placement units. Handles are expected to be cheap to clone.
#[async_trait]
pub trait PlacementStore: Send + Sync {
    type Unit: PlacementUnit;

    async fn begin(&self) -> Result<Self::Unit, StoreError>;
}
