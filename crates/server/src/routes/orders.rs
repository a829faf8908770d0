//! Order route handlers: storefront checkout plus the admin back-office.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use bancarella_core::OrderId;

use crate::db::{AuditLogRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireUser};
use crate::models::{
    AdminOrder, AuditLogEntry, Order, OrderItemRequest, OrderWithItems, PlacedOrder,
    UpdateOrderInput,
};
use crate::services::OrderService;
use crate::state::AppState;

/// Default number of audit entries returned by the admin log view.
const AUDIT_LOG_LIMIT: i64 = 200;

/// POST /api/orders
///
/// Checkout: reserves stock for every requested item atomically, subject to
/// the pending-item quota.
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(items): Json<Vec<OrderItemRequest>>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = OrderService::new(state.pool())
        .place_order(&user, &items)
        .await?;

    tracing::info!(
        order_id = %placed.order.id,
        user_id = %user.id,
        total = %placed.order.total,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /api/orders
pub async fn list_mine(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/pending-count
///
/// Pending item quantity for the logged-in user, so the cart can warn
/// before checkout.
pub async fn pending_count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<serde_json::Value>> {
    let pending = OrderService::new(state.pool())
        .pending_quantity_for(&user)
        .await?;
    Ok(Json(json!({ "pending": pending })))
}

/// GET /api/orders/{id}
///
/// Owners see their own orders; admins see any.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let order = OrderRepository::new(state.pool())
        .get_with_items(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.order.user_id != user.id && !user.is_admin {
        // Hide existence from other users
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    Ok(Json(order))
}

/// GET /api/admin/orders
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrder>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// PATCH /api/orders/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(input): Json<UpdateOrderInput>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .update_order(&admin, id, input)
        .await?;

    tracing::info!(order_id = %id, admin = %admin.email, "order updated");

    Ok(Json(order))
}

/// DELETE /api/orders/{id} (admin)
///
/// Compensating deletion: restores every line item's stock in the same
/// transaction that removes the order.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<serde_json::Value>> {
    OrderService::new(state.pool())
        .delete_order(&admin, id)
        .await?;

    tracing::info!(order_id = %id, admin = %admin.email, "order deleted, stock restored");

    Ok(Json(json!({ "ok": true })))
}

/// GET /api/admin/logs
pub async fn audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AuditLogEntry>>> {
    let entries = AuditLogRepository::new(state.pool())
        .list(AUDIT_LOG_LIMIT)
        .await?;
    Ok(Json(entries))
}
