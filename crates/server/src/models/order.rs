//! Order domain types.
//!
//! An order is a reservation, not a payment: placing one decrements variant
//! stock and counts toward the owner's pending-item quota until an admin
//! marks it paid (or deletes it, restoring stock).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bancarella_core::{OrderId, OrderItemId, OrderStatus, UserId, VariantId};

/// An order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owner of the reservation.
    pub user_id: UserId,
    /// Total amount, computed at placement time.
    pub total: Decimal,
    /// `PENDING` until an admin marks the order paid.
    pub status: OrderStatus,
    /// Whether the goods have been handed over.
    pub delivered: bool,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A line item. Immutable once created: `price` is the unit price captured
/// at placement time and never recomputed from the live catalog.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// The reserved variant.
    pub variant_id: VariantId,
    /// Units reserved.
    pub quantity: i32,
    /// Unit price snapshot.
    pub price: Decimal,
    /// Product name for display (joined, not stored on the item).
    pub product_name: String,
    /// Color name for display.
    pub color: String,
    /// Size label for display.
    pub size: String,
}

/// An order with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order as shown in the admin back-office: includes owner identity.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub user_email: String,
    pub user_name: String,
    pub user_class: Option<String>,
    pub items: Vec<OrderItem>,
}

/// A requested line item at checkout.
///
/// `unit_price` is supplied by the caller and trusted, matching the
/// observed storefront behavior; the captured snapshot is what lands in
/// `order_item.price`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub variant_id: VariantId,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Cart display name, surfaced in the variant-not-found error so the
    /// message names the item as the shopper sees it.
    pub display_name: Option<String>,
}

/// Result of a successful placement.
///
/// `audit_recorded` is false when the post-commit audit write failed; the
/// order itself is committed either way.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub audit_recorded: bool,
}

/// Admin PATCH body: only supplied fields are updated.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateOrderInput {
    pub status: Option<OrderStatus>,
    pub delivered: Option<bool>,
}
