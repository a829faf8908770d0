//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bancarella_core::{Email, UserId};

/// A storefront user (domain type).
///
/// Students authenticate with email + password. The `is_admin` flag grants
/// access to the back-office endpoints (order management, product CRUD,
/// audit log).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Class/cohort label (e.g., "3B"), if known.
    pub class: Option<String>,
    /// Whether the user may perform admin operations.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
