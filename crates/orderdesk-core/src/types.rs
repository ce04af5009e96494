//! # Domain Types
//!
//! Core domain types used throughout orderdesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  customer_id    │◄──│  order_id       │       │
//! │  │  name, email    │   │  status         │   │  line_number    │       │
//! │  │  address?       │   │  created_at     │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   │  unit_price ❄   │       │
//! │                                              │  product_id ─┐  │       │
//! │  ┌─────────────────┐                         └──────────────┼──┘       │
//! │  │    Product      │◄───────────────────────────────────────┘          │
//! │  │  id, sku        │                                                    │
//! │  │  price_cents    │   ❄ = copied at placement, never joined           │
//! │  │  current_stock  │                                                    │
//! │  │  reorder_level  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by an opaque UUID v4 string generated by the store.
//! Products additionally carry a unique business identifier, the SKU.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationResult;
use crate::money::Money;
use crate::validation;

// =============================================================================
// Product
// =============================================================================

/// A product that can be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Current price in cents. Order items copy this value at placement.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub current_stock: i64,

    /// Informational threshold for reorder reports; not enforced on orders.
    pub reorder_level: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether current stock covers `quantity` units.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub current_stock: i64,
    #[serde(default)]
    pub reorder_level: i64,
}

impl NewProduct {
    /// Runs the field rules from [`crate::validation`].
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_sku(&self.sku)?;
        validation::validate_name("name", &self.name)?;
        validation::validate_price_cents(self.price_cents)?;
        validation::validate_non_negative("current_stock", self.current_stock)?;
        validation::validate_non_negative("reorder_level", self.reorder_level)?;
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who places orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_email(&self.email)?;
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// Placement only ever produces `Pending`; later lifecycle states belong to
/// whatever fulfils orders downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
}

impl OrderStatus {
    /// The stored/serialized spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order.
///
/// `unit_price_cents` is a frozen copy of the product price at placement, so
/// later price changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// 0-based position in the original request.
    pub line_number: i64,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit_price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order View
// =============================================================================

/// An order materialized together with its items in creation order.
///
/// This is what placement returns and what the query side reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderView {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl OrderView {
    /// Joins a header with its items, sorting items by line number.
    pub fn new(order: Order, mut items: Vec<OrderItem>) -> Self {
        items.sort_by_key(|item| item.line_number);
        OrderView {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            created_at: order.created_at,
            items,
        }
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Total units ordered for one product across all lines.
    pub fn quantity_for(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|item| item.product_id == product_id)
            .fold(0i64, |acc, item| acc.saturating_add(item.quantity))
    }
}

// =============================================================================
// Placement Request
// =============================================================================

/// One requested line: which product and how many.
///
/// `quantity` is signed so that bad input reaches the engine and is reported
/// as `InvalidQuantity` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// A request to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderLineRequest>,
}

impl PlaceOrderRequest {
    /// Starts a request with no lines.
    pub fn new(customer_id: impl Into<String>) -> Self {
        PlaceOrderRequest {
            customer_id: customer_id.into(),
            items: Vec::new(),
        }
    }

    /// Appends a line.
    ///
    /// ```rust
    /// use orderdesk_core::PlaceOrderRequest;
    ///
    /// let request = PlaceOrderRequest::new("cust-1")
    ///     .line("prod-1", 2)
    ///     .line("prod-2", 1);
    /// assert_eq!(request.items.len(), 2);
    /// ```
    pub fn line(mut self, product_id: impl Into<String>, quantity: i64) -> Self {
        self.items.push(OrderLineRequest {
            product_id: product_id.into(),
            quantity,
        });
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
