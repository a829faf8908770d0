//! Session-stored identity.

use serde::{Deserialize, Serialize};

use bancarella_core::UserId;

use crate::models::User;

/// Session storage keys.
pub mod session_keys {
    /// Key under which the authenticated user is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated identity attached to a request.
///
/// Resolved once by the auth extractor and passed explicitly into service
/// calls; services never read session state themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Database ID of the user.
    pub id: UserId,
    /// Email address at login time.
    pub email: String,
    /// Display name at login time.
    pub name: String,
    /// Whether admin endpoints are allowed.
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
            name: user.name.clone(),
            is_admin: user.is_admin,
        }
    }
}
