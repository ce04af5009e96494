//! # Error Types
//!
//! Domain-specific error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  ├── ValidationError  - Field-level input failures                     │
//! │  ├── StoreError       - What a placement store reports                 │
//! │  └── PlacementError   - The outcome taxonomy of place_order            │
//! │                                                                         │
//! │  orderdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → StoreError → PlacementError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Placement Error
// =============================================================================

/// Why an order placement did not produce an order.
///
/// Every variant is terminal for the attempt and guarantees nothing was
/// persisted: validation failures abort before any write, and
/// `PersistenceFailure` is raised only after the unit of work was rolled back
/// (or never opened). Callers may retry `PersistenceFailure`.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// The referenced customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// The request carried no line items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A line asked for zero or a negative quantity.
    ///
    /// `line` is the 0-based position in the request.
    #[error("Invalid quantity {quantity} for {product_id} on line {line}")]
    InvalidQuantity {
        line: usize,
        product_id: String,
        quantity: i64,
    },

    /// A line references a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock to cover the request.
    ///
    /// `requested` is the cumulative quantity of every line for this product
    /// up to and including the failing one; `available` is the stock read at
    /// validation time.
    ///
    /// ```text
    /// stock=5, line A qty 3 (ok, 3 ≤ 5), line B qty 3 (3+3 = 6 > 5)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 5, requested: 6 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// The store could not complete the unit of work.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl PlacementError {
    /// True for failures caused by the request itself rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PlacementError::PersistenceFailure(_))
    }
}

/// Convenience type alias for placement results.
pub type PlacementResult<T> = Result<T, PlacementError>;

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by a [`crate::placement::PlacementStore`] implementation.
///
/// Stores translate their native errors into one of three classes so the
/// engine can decide whether re-running the placement makes sense.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another writer got there first (lock contention, stale snapshot,
    /// conditional update matched nothing).
    #[error("write conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other store failure.
    #[error("store failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether running the whole placement again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for new products and customers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., bad SKU characters, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = PlacementError::InsufficientStock {
            product_id: "p-1".to_string(),
            sku: "WIDGET-01".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for WIDGET-01: available 3, requested 5"
        );
    }

    #[test]
    fn test_store_error_converts_to_persistence_failure() {
        let err: PlacementError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, PlacementError::PersistenceFailure(_)));
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Persistence failure: store failure: disk full");
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(StoreError::Conflict("busy".into()).is_retryable());
        assert!(!StoreError::Unavailable("closed".into()).is_retryable());
        assert!(!StoreError::Backend("boom".into()).is_retryable());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }
}
