//! # orderdesk-db: Database Layer for orderdesk
//!
//! SQLite persistence for the order placement engine, using sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        orderdesk Data Flow                              │
//! │                                                                         │
//! │  Caller (API layer, seed binary)                                       │
//! │       │  db.place_order(&request)                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  orderdesk-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  product.rs   │    │  (embedded)  │  │   │
//! │  │   │               │    │  customer.rs  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  order.rs     │    │ 001_init.sql │  │   │
//! │  │   │ order_engine()│    └───────────────┘    │ 002_ledger   │  │   │
//! │  │   └──────┬────────┘                         └──────────────┘  │   │
//! │  │          ▼                                                      │   │
//! │  │   SqlitePlacementStore (placement.rs) ── one tx per attempt    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Settings from environment variables
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`placement`] - Transactional store behind the placement engine
//! - [`repository`] - Repository implementations (product, customer, order)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderdesk_core::PlaceOrderRequest;
//! use orderdesk_db::{Database, Settings};
//!
//! let settings = Settings::load()?;
//! let db = Database::new(settings.db_config()).await?;
//!
//! let view = db
//!     .place_order(&PlaceOrderRequest::new(customer_id).line(product_id, 2))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod placement;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, Settings};
pub use error::{DbError, DbResult};
pub use placement::{SqlitePlacementStore, SqlitePlacementUnit};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
