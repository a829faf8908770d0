//! Order service: placement, admin updates, and compensating deletion.
//!
//! Placement is the one genuinely delicate operation in the system. The
//! sequence is:
//!
//! 1. validate the request shape (before any data access),
//! 2. check the pending-item quota (a soft limit, see below),
//! 3. run the stock-decrement + order-insert transaction
//!    ([`OrderRepository::create`]), which is where the no-oversell
//!    guarantee lives,
//! 4. write the `ORDER_CREATED` audit entry best-effort after commit.
//!
//! The quota check reads pending quantities outside the transaction, so
//! two concurrent checkouts by the same user can both pass it and overshoot
//! the limit. That staleness is accepted by design: the quota is a courtesy
//! cap, not an inventory invariant, and hardening it would mean locking the
//! user's whole pending-order aggregate on every checkout.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use bancarella_core::{AuditAction, OrderId, OrderStatus};

use crate::db::{AuditLogRepository, OrderRepository, RepositoryError};
use crate::models::{CurrentUser, Order, OrderItemRequest, PlacedOrder, UpdateOrderInput};

/// Maximum pending (unpaid) items a user may hold across all orders.
pub const PENDING_ITEM_LIMIT: i64 = 5;

/// Errors that can occur while working with orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed request, rejected before any data access.
    #[error("{0}")]
    Validation(String),

    /// The pending-item quota would be exceeded.
    #[error("Limit exceeded. You have {pending} pending items. Max allowed is {PENDING_ITEM_LIMIT}.")]
    QuotaExceeded {
        /// Quantity already pending for this user.
        pending: i64,
    },

    /// Repository/database error (includes stock failures).
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service coordinating order operations.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    audit: AuditLogRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            audit: AuditLogRepository::new(pool),
        }
    }

    /// Place an order for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for a malformed request,
    /// `OrderError::QuotaExceeded` when pending + requested items exceed
    /// the limit, and `OrderError::Repository` for stock or database
    /// failures (the whole transaction rolls back).
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        items: &[OrderItemRequest],
    ) -> Result<PlacedOrder, OrderError> {
        validate_items(items)?;

        let pending = self.orders.pending_quantity_for(user.id).await?;
        let requested = requested_quantity(items);
        if pending + requested > PENDING_ITEM_LIMIT {
            return Err(OrderError::QuotaExceeded { pending });
        }

        let total = compute_total(items);
        let order = self.orders.create(user.id, total, items).await?;

        // Best-effort: the order is committed; a failed audit write is a
        // warning, not a rollback.
        let details = format!(
            "Order {} created with {} items. Total: {}",
            order.id,
            items.len(),
            order.total
        );
        let audit_recorded = match self
            .audit
            .record(AuditAction::OrderCreated, &details, Some(user.id))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "audit write failed after order commit");
                false
            }
        };

        Ok(PlacedOrder {
            order,
            audit_recorded,
        })
    }

    /// Update an order's status and/or delivered flag (admin).
    ///
    /// The audit action is derived from which fields were supplied; the
    /// write is best-effort after the update.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository(RepositoryError::NotFound)` if the
    /// order doesn't exist.
    pub async fn update_order(
        &self,
        acting: &CurrentUser,
        id: OrderId,
        input: UpdateOrderInput,
    ) -> Result<Order, OrderError> {
        let order = self.orders.update(id, input.status, input.delivered).await?;

        let (action, details) = audit_for_update(id, input);
        if let Err(e) = self.audit.record(action, &details, Some(acting.id)).await {
            tracing::warn!(order_id = %id, error = %e, "audit write failed after order update");
        }

        Ok(order)
    }

    /// Delete an order, restoring stock (admin). The `ORDER_DELETED` audit
    /// entry commits inside the same transaction as the restoration.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository(RepositoryError::NotFound)` if the
    /// order doesn't exist (checked inside the transaction, so a concurrent
    /// delete of the same order cannot also succeed).
    pub async fn delete_order(&self, acting: &CurrentUser, id: OrderId) -> Result<(), OrderError> {
        self.orders
            .delete_restoring_stock(id, Some(acting.id))
            .await?;
        Ok(())
    }

    /// Pending item quantity for the given user (for pre-checkout warnings).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn pending_quantity_for(&self, user: &CurrentUser) -> Result<i64, OrderError> {
        Ok(self.orders.pending_quantity_for(user.id).await?)
    }
}

/// Reject malformed placement requests before any data access.
fn validate_items(items: &[OrderItemRequest]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Validation("Invalid items".to_string()));
    }

    for item in items {
        if item.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "Invalid quantity {} for variant {}",
                item.quantity, item.variant_id
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(OrderError::Validation(format!(
                "Invalid price for variant {}",
                item.variant_id
            )));
        }
    }

    Ok(())
}

/// Total quantity requested across all line items.
fn requested_quantity(items: &[OrderItemRequest]) -> i64 {
    items.iter().map(|i| i64::from(i.quantity)).sum()
}

/// Order total: sum of quantity x unit price over the request.
///
/// The unit price comes from the caller and is captured as-is into the
/// line item snapshot; it is not re-derived from the live catalog.
fn compute_total(items: &[OrderItemRequest]) -> Decimal {
    items
        .iter()
        .map(|i| i.unit_price * Decimal::from(i.quantity))
        .sum()
}

/// Derive the audit action and details for an order update from which
/// fields were supplied.
fn audit_for_update(id: OrderId, input: UpdateOrderInput) -> (AuditAction, String) {
    match (input.status, input.delivered) {
        (Some(status), Some(delivered)) => (
            AuditAction::OrderUpdated,
            format!("Order {id} updated: Status={status}, Delivered={delivered}"),
        ),
        (Some(status), None) => {
            let action = match status {
                OrderStatus::Paid => AuditAction::OrderPaid,
                OrderStatus::Pending => AuditAction::OrderUnpaid,
            };
            (action, format!("Order {id} marked as {status}."))
        }
        (None, Some(delivered)) => {
            let action = if delivered {
                AuditAction::OrderDelivered
            } else {
                AuditAction::OrderUndelivered
            };
            let label = if delivered { "DELIVERED" } else { "NOT DELIVERED" };
            (action, format!("Order {id} marked as {label}."))
        }
        (None, None) => (AuditAction::OrderUpdated, format!("Order {id} updated.")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bancarella_core::VariantId;

    fn item(variant: i32, quantity: i32, price: &str) -> OrderItemRequest {
        OrderItemRequest {
            variant_id: VariantId::new(variant),
            quantity,
            unit_price: price.parse().unwrap(),
            display_name: None,
        }
    }

    #[test]
    fn test_validate_rejects_empty_request() {
        assert!(matches!(
            validate_items(&[]),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        assert!(validate_items(&[item(1, 0, "10.00")]).is_err());
        assert!(validate_items(&[item(1, -2, "10.00")]).is_err());
        assert!(validate_items(&[item(1, 1, "10.00"), item(2, 0, "5.00")]).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        assert!(validate_items(&[item(1, 1, "-0.01")]).is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(validate_items(&[item(1, 1, "10.00"), item(2, 3, "0")]).is_ok());
    }

    #[test]
    fn test_requested_quantity_sums_all_items() {
        let items = [item(1, 2, "10.00"), item(2, 3, "5.00")];
        assert_eq!(requested_quantity(&items), 5);
    }

    #[test]
    fn test_compute_total() {
        let items = [item(1, 3, "10.00"), item(2, 1, "2.50")];
        assert_eq!(compute_total(&items), "32.50".parse().unwrap());
    }

    #[test]
    fn test_quota_boundary() {
        // p + r <= 5 succeeds; p + r = 6 fails.
        for (pending, requested, ok) in [(0_i64, 5_i64, true), (2, 3, true), (3, 3, false), (5, 1, false)] {
            let within = pending + requested <= PENDING_ITEM_LIMIT;
            assert_eq!(within, ok, "pending={pending} requested={requested}");
        }
    }

    #[test]
    fn test_quota_error_message_states_pending_and_limit() {
        let err = OrderError::QuotaExceeded { pending: 4 };
        assert_eq!(
            err.to_string(),
            "Limit exceeded. You have 4 pending items. Max allowed is 5."
        );
    }

    #[test]
    fn test_audit_for_update_status_only() {
        let id = OrderId::new(12);
        let (action, details) = audit_for_update(
            id,
            UpdateOrderInput {
                status: Some(OrderStatus::Paid),
                delivered: None,
            },
        );
        assert_eq!(action, AuditAction::OrderPaid);
        assert_eq!(details, "Order 12 marked as PAID.");

        let (action, details) = audit_for_update(
            id,
            UpdateOrderInput {
                status: Some(OrderStatus::Pending),
                delivered: None,
            },
        );
        assert_eq!(action, AuditAction::OrderUnpaid);
        assert_eq!(details, "Order 12 marked as PENDING.");
    }

    #[test]
    fn test_audit_for_update_delivered_only() {
        let id = OrderId::new(12);
        let (action, details) = audit_for_update(
            id,
            UpdateOrderInput {
                status: None,
                delivered: Some(true),
            },
        );
        assert_eq!(action, AuditAction::OrderDelivered);
        assert_eq!(details, "Order 12 marked as DELIVERED.");

        let (action, details) = audit_for_update(
            id,
            UpdateOrderInput {
                status: None,
                delivered: Some(false),
            },
        );
        assert_eq!(action, AuditAction::OrderUndelivered);
        assert_eq!(details, "Order 12 marked as NOT DELIVERED.");
    }

    #[test]
    fn test_audit_for_update_both_fields() {
        let (action, details) = audit_for_update(
            OrderId::new(3),
            UpdateOrderInput {
                status: Some(OrderStatus::Paid),
                delivered: Some(true),
            },
        );
        assert_eq!(action, AuditAction::OrderUpdated);
        assert_eq!(details, "Order 3 updated: Status=PAID, Delivered=true");
    }

    #[test]
    fn test_audit_for_update_no_fields() {
        let (action, details) = audit_for_update(
            OrderId::new(3),
            UpdateOrderInput {
                status: None,
                delivered: None,
            },
        );
        assert_eq!(action, AuditAction::OrderUpdated);
        assert_eq!(details, "Order 3 updated.");
    }
}
