//! Database operations for the Bancarella `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `user` - Students and admins (email, name, class, admin flag, password)
//! - `product` / `product_color` / `product_variant` - Catalog tree;
//!   `product_variant.stock` is the only value the checkout path mutates
//! - `order` / `order_item` - Reservations with price snapshots
//! - `audit_log` - Append-only trail of state-changing operations
//!
//! Session storage lives in the `tower_sessions` schema.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bancarella-cli -- migrate
//! ```
//!
//! All queries use the sqlx runtime API with explicit row structs
//! (`#[derive(sqlx::FromRow)]`), so the workspace builds without a live
//! database.

pub mod audit;
pub mod orders;
pub mod products;
pub mod stock;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bancarella_core::VariantId;

pub use audit::AuditLogRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, referenced product).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A requested variant does not exist. Aborts the whole transaction.
    #[error("{}", variant_not_found_message(.variant, .item))]
    VariantNotFound {
        /// The missing variant id.
        variant: VariantId,
        /// Cart display name of the requesting line item, when known.
        item: Option<String>,
    },

    /// Requested quantity exceeds live stock. Aborts the whole transaction.
    #[error("Insufficient stock for {variant}. Available: {available}")]
    InsufficientStock {
        /// Display label of the variant (color - size).
        variant: String,
        /// Units currently available.
        available: i32,
        /// Units that were requested.
        requested: i32,
    },
}

/// Error message for a missing variant, preferring the cart's own display
/// name over the raw id when the request supplied one.
fn variant_not_found_message(variant: &VariantId, item: &Option<String>) -> String {
    item.as_deref().map_or_else(
        || format!("Variant {variant} not found"),
        |name| format!("Variant not found for item {name}"),
    )
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_includes_availability() {
        let err = RepositoryError::InsufficientStock {
            variant: "Navy - M".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(err.to_string(), "Insufficient stock for Navy - M. Available: 2");
    }

    #[test]
    fn test_variant_not_found_message_without_item_label() {
        let err = RepositoryError::VariantNotFound {
            variant: VariantId::new(9),
            item: None,
        };
        assert_eq!(err.to_string(), "Variant 9 not found");
    }

    #[test]
    fn test_variant_not_found_message_names_the_cart_item() {
        let err = RepositoryError::VariantNotFound {
            variant: VariantId::new(9),
            item: Some("Felpa Navy M".to_string()),
        };
        assert_eq!(err.to_string(), "Variant not found for item Felpa Navy M");
    }
}
