//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/login                - Login with email/password
//! POST   /auth/logout               - Logout
//! GET    /auth/me                   - Current session identity
//!
//! # Catalog
//! GET    /api/products              - Active products (admin sees all with ?include_inactive=true)
//! GET    /api/products/{id}         - Product detail with colors/variants
//! POST   /api/products              - Create product (admin)
//! PUT    /api/products/{id}         - Update product, reconciling colors/variants (admin)
//! DELETE /api/products/{id}         - Delete product (admin; fails if referenced by orders)
//!
//! # Stock
//! POST   /api/stock/check           - Live stock for a set of variant ids
//!
//! # Orders (requires auth)
//! POST   /api/orders                - Place an order (checkout)
//! GET    /api/orders                - Own orders, newest first
//! GET    /api/orders/pending-count  - Own pending item quantity
//! GET    /api/orders/{id}           - Own order detail
//! PATCH  /api/orders/{id}           - Update status / delivered flag (admin)
//! DELETE /api/orders/{id}           - Delete order, restoring stock (admin)
//!
//! # Back-office (requires admin)
//! GET    /api/admin/orders          - All orders with owner identity
//! GET    /api/admin/logs            - Recent audit log entries
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod stock;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place).get(orders::list_mine))
        .route("/pending-count", get(orders::pending_count))
        .route(
            "/{id}",
            get(orders::show).patch(orders::update).delete(orders::delete),
        )
}

/// Create the admin back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list_all))
        .route("/logs", get(orders::audit_logs))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/auth", auth_routes())
        .nest("/api/products", product_routes())
        .route("/api/stock/check", post(stock::check))
        .nest("/api/orders", order_routes())
        .nest("/api/admin", admin_routes())
}

/// Liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: verifies the database is reachable.
async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(state.pool())
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(json!({ "status": "ready" })))
}
