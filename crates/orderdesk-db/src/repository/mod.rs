//! # Repository Module
//!
//! Database repository implementations for orderdesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.products().get_by_sku("WIDGET-01")                         │
//! │       ▼                                                                 │
//! │  ProductRepository / CustomerRepository / OrderRepository              │
//! │       │                                                                 │
//! │       │  SQL Query (on the pool)                                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The placement transaction reuses the same SQL through the             │
//! │  crate-private helpers (fetch_product, insert_order, ...), which take   │
//! │  any executor: the pool or `&mut *tx`.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and reorder report
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD
//! - [`OrderRepository`](order::OrderRepository) - Order queries

pub mod customer;
pub mod order;
pub mod product;
