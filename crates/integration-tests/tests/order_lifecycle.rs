//! Tests for order state, audit actions, and checkout wire shapes.
//!
//! These verify the domain logic and JSON contracts without requiring a
//! running database.

use std::str::FromStr;

use bancarella_core::{AuditAction, OrderStatus};
use bancarella_server::models::{OrderItemRequest, UpdateOrderInput};
use bancarella_server::services::OrderError;
use bancarella_server::services::orders::PENDING_ITEM_LIMIT;

// =============================================================================
// Order Status Tests
// =============================================================================

#[test]
fn test_order_status_defaults_to_pending() {
    assert_eq!(OrderStatus::default(), OrderStatus::Pending);
}

#[test]
fn test_order_status_display() {
    assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
    assert_eq!(OrderStatus::Paid.to_string(), "PAID");
}

#[test]
fn test_order_status_roundtrip() {
    for status in [OrderStatus::Pending, OrderStatus::Paid] {
        let parsed = OrderStatus::from_str(&status.to_string()).expect("roundtrip");
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_order_status_rejects_unknown_values() {
    assert!(OrderStatus::from_str("SHIPPED").is_err());
    assert!(OrderStatus::from_str("pending").is_err());
    assert!(OrderStatus::from_str("").is_err());
}

#[test]
fn test_order_status_json_encoding() {
    let json = serde_json::to_string(&OrderStatus::Paid).expect("serialize");
    assert_eq!(json, "\"PAID\"");

    let status: OrderStatus = serde_json::from_str("\"PENDING\"").expect("deserialize");
    assert_eq!(status, OrderStatus::Pending);
}

// =============================================================================
// Audit Action Tests
// =============================================================================

#[test]
fn test_audit_action_wire_values() {
    assert_eq!(AuditAction::OrderCreated.as_str(), "ORDER_CREATED");
    assert_eq!(AuditAction::OrderUpdated.as_str(), "ORDER_UPDATED");
    assert_eq!(AuditAction::OrderPaid.as_str(), "ORDER_PAID");
    assert_eq!(AuditAction::OrderUnpaid.as_str(), "ORDER_UNPAID");
    assert_eq!(AuditAction::OrderDelivered.as_str(), "ORDER_DELIVERED");
    assert_eq!(AuditAction::OrderUndelivered.as_str(), "ORDER_UNDELIVERED");
    assert_eq!(AuditAction::OrderDeleted.as_str(), "ORDER_DELETED");
}

#[test]
fn test_audit_action_roundtrip() {
    for action in [
        AuditAction::OrderCreated,
        AuditAction::OrderUpdated,
        AuditAction::OrderPaid,
        AuditAction::OrderUnpaid,
        AuditAction::OrderDelivered,
        AuditAction::OrderUndelivered,
        AuditAction::OrderDeleted,
    ] {
        let parsed = AuditAction::from_str(action.as_str()).expect("roundtrip");
        assert_eq!(parsed, action);
    }
}

// =============================================================================
// Checkout Wire Shape Tests
// =============================================================================

#[test]
fn test_checkout_body_deserializes() {
    let body = r#"[
        {"variant_id": 7, "quantity": 2, "unit_price": "14.90"},
        {"variant_id": 9, "quantity": 1, "unit_price": "34.90", "display_name": "Felpa Navy M"}
    ]"#;

    let items: Vec<OrderItemRequest> = serde_json::from_str(body).expect("deserialize");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].variant_id.as_i32(), 7);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price.to_string(), "14.90");
    assert!(items[0].display_name.is_none());
    assert_eq!(items[1].display_name.as_deref(), Some("Felpa Navy M"));
}

#[test]
fn test_update_body_is_partial() {
    let input: UpdateOrderInput = serde_json::from_str(r#"{"status": "PAID"}"#).expect("status");
    assert_eq!(input.status, Some(OrderStatus::Paid));
    assert_eq!(input.delivered, None);

    let input: UpdateOrderInput =
        serde_json::from_str(r#"{"delivered": true}"#).expect("delivered");
    assert_eq!(input.status, None);
    assert_eq!(input.delivered, Some(true));

    let input: UpdateOrderInput = serde_json::from_str("{}").expect("empty");
    assert_eq!(input.status, None);
    assert_eq!(input.delivered, None);
}

#[test]
fn test_update_body_rejects_invalid_status() {
    let result = serde_json::from_str::<UpdateOrderInput>(r#"{"status": "SHIPPED"}"#);
    assert!(result.is_err());
}

// =============================================================================
// Quota Tests
// =============================================================================

#[test]
fn test_pending_item_limit_is_five() {
    assert_eq!(PENDING_ITEM_LIMIT, 5);
}

#[test]
fn test_quota_error_message() {
    let err = OrderError::QuotaExceeded { pending: 3 };
    assert_eq!(
        err.to_string(),
        "Limit exceeded. You have 3 pending items. Max allowed is 5."
    );
}
