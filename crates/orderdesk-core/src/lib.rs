//! # orderdesk-core: Pure Business Logic for orderdesk
//!
//! This crate holds the domain model and the order placement engine. It has
//! zero I/O dependencies: the engine reaches storage only through the traits
//! in [`placement::store`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        orderdesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    API layer (external)                         │   │
//! │  │    maps requests ──► PlaceOrderRequest, PlacementError ──► reply │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ orderdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ placement │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Engine   │  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │  Snapshot │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └───────────┘  │   │
//! │  │                                       │ store traits            │   │
//! │  └───────────────────────────────────────┼─────────────────────────┘   │
//! │                                          │                              │
//! │  ┌───────────────────────────────────────▼─────────────────────────┐   │
//! │  │                 orderdesk-db (Database Layer)                   │   │
//! │  │       SQLite transactions, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, OrderItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Validation, store and placement errors
//! - [`validation`] - Field rules for new products and customers
//! - [`placement`] - The order placement engine and its store traits
//!
//! ## Example Usage
//!
//! ```rust
//! use orderdesk_core::money::Money;
//!
//! let price = Money::from_cents(250); // $2.50
//! assert_eq!(price.multiply_quantity(4).cents(), 1000);
//! assert_eq!(Money::parse("2.50").unwrap(), price);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod placement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{PlacementError, PlacementResult, StoreError, ValidationError};
pub use money::Money;
pub use placement::{OrderPlacementEngine, PlacementStore, PlacementUnit};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How many times the engine runs a placement before giving up on write
/// conflicts.
///
/// Only conflict-class store failures are retried; a re-run re-reads stock,
/// so a lost race normally ends in `InsufficientStock` on the second pass.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 3;
