//! Audit log domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bancarella_core::{AuditAction, AuditLogId, UserId};

/// An append-only audit record. Never updated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogEntry {
    /// Unique entry ID.
    pub id: AuditLogId,
    /// What happened.
    pub action: AuditAction,
    /// Human-readable details.
    pub details: String,
    /// Acting user, if still present.
    pub user_id: Option<UserId>,
    /// Acting user's email at read time (joined for the admin view).
    pub user_email: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
