//! # Order Placement
//!
//! Turns a [`PlaceOrderRequest`] into a persisted order, or into nothing.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       place_order(request)                              │
//! │                                                                         │
//! │  store.begin() ──► unit (isolated transaction)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. customer exists?            ✗ CustomerNotFound                     │
//! │  2. any lines?                  ✗ EmptyOrder                           │
//! │  3. VALIDATE every line (reads only, StockSnapshot)                    │
//! │       quantity > 0?             ✗ InvalidQuantity                      │
//! │       product exists?           ✗ ProductNotFound                      │
//! │       cumulative qty ≤ stock?   ✗ InsufficientStock                    │
//! │       │                                                                 │
//! │       │  any ✗ ──► rollback, nothing written                           │
//! │       ▼                                                                 │
//! │  4. APPLY: create order (PENDING), then per line                       │
//! │       decrement stock, create item with the snapshot price             │
//! │       ▼                                                                 │
//! │  5. commit ──► all visible    |  store failure ──► PersistenceFailure   │
//! │       ▼                                                                 │
//! │  6. OrderView (items in request order)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation and mutation are separate passes so that a bad line late in the
//! request can never leave an earlier line's stock decremented.
//!
//! ## Write Conflicts
//! When the store reports [`StoreError::Conflict`](crate::StoreError) the
//! whole placement is re-run in a fresh unit, up to `max_attempts` times. The
//! re-run re-reads stock, so the loser of a race for the last units ends with
//! `InsufficientStock` rather than an oversell.

mod snapshot;
pub mod store;


use tracing::{debug, info, instrument, warn};

use crate::error::{PlacementError, PlacementResult};
use crate::types::{OrderLineRequest, OrderStatus, OrderView, PlaceOrderRequest};
use crate::validation;
use crate::DEFAULT_PLACEMENT_ATTEMPTS;

pub use snapshot::{PlannedLine, StockSnapshot};
pub use store::{InventoryStore, OrderLedger, PlacementStore, PlacementUnit};

/// Places orders against an injected [`PlacementStore`].
///
/// Build one per request from a store handle:
///
/// ```rust,ignore
/// let engine = OrderPlacementEngine::new(store.clone());
/// let view = engine.place_order(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderPlacementEngine<S> {
    store: S,
    max_attempts: u32,
}

impl<S: PlacementStore> OrderPlacementEngine<S> {
    pub fn new(store: S) -> Self {
        OrderPlacementEngine {
            store,
            max_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    /// Sets how many times a conflicting placement is attempted (minimum 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists an order as one atomic unit.
    ///
    /// ## Returns
    /// * `Ok(OrderView)` - order, items and stock decrements are committed
    /// * `Err(PlacementError)` - nothing was persisted
    #[instrument(
        name = "place_order",
        skip_all,
        fields(customer_id = %request.customer_id, lines = request.items.len())
    )]
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> PlacementResult<OrderView> {
        let mut attempt = 1;
        loop {
            match self.attempt(request).await {
                Err(PlacementError::PersistenceFailure(err))
                    if err.is_retryable() && attempt < self.max_attempts =>
                {
                    warn!(attempt, error = %err, "Placement hit a write conflict, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn attempt(&self, request: &PlaceOrderRequest) -> PlacementResult<OrderView> {
        let mut unit = self.store.begin().await?;

        match apply(&mut unit, request).await {
            Ok(view) => {
                unit.commit().await?;
                info!(
                    order_id = %view.id,
                    items = view.items.len(),
                    total = %view.total(),
                    "Order placed"
                );
                Ok(view)
            }
            Err(err) => {
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed, unit discarded");
                }
                if err.is_validation() {
                    debug!(error = %err, "Placement rejected");
                } else {
                    warn!(error = %err, "Placement aborted by the store");
                }
                Err(err)
            }
        }
    }
}

/// Steps 1-4 and 6, all inside `unit`. The caller commits.
async fn apply<U: PlacementUnit>(
    unit: &mut U,
    request: &PlaceOrderRequest,
) -> PlacementResult<OrderView> {
    if unit.get_customer(&request.customer_id).await?.is_none() {
        return Err(PlacementError::CustomerNotFound(request.customer_id.clone()));
    }

    if request.items.is_empty() {
        return Err(PlacementError::EmptyOrder);
    }

    let plan = validate_lines(unit, &request.items).await?;

    let order = unit
        .create_order(&request.customer_id, OrderStatus::Pending)
        .await?;

    let mut items = Vec::with_capacity(plan.len());
    for line in &plan {
        unit.decrement_stock(&line.product_id, line.quantity).await?;
        let item = unit
            .create_order_item(&order.id, &line.product_id, line.quantity, line.unit_price)
            .await?;
        items.push(item);
    }

    Ok(OrderView::new(order, items))
}

/// The read-only validation pass. Lines are checked in request order and the
/// first failure wins.
async fn validate_lines<U: InventoryStore>(
    unit: &mut U,
    lines: &[OrderLineRequest],
) -> PlacementResult<Vec<PlannedLine>> {
    let mut snapshot = StockSnapshot::new();
    let mut plan = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        if validation::validate_quantity(line.quantity).is_err() {
            return Err(PlacementError::InvalidQuantity {
                line: index,
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            });
        }

        if !snapshot.contains(&line.product_id) {
            let product = unit
                .get_product(&line.product_id)
                .await?
                .ok_or_else(|| PlacementError::ProductNotFound(line.product_id.clone()))?;
            snapshot.insert(product);
        }

        plan.push(snapshot.reserve(&line.product_id, line.quantity)?);
    }

    Ok(plan)
}
