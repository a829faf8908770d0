//! Audit log repository.
//!
//! The trail is append-only: there is no update or delete path. Callers
//! that log after a committed primary operation treat a failure here as a
//! warning, never as a reason to abort (see `services::orders`).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use bancarella_core::{AuditAction, AuditLogId, UserId};

use super::RepositoryError;
use crate::models::AuditLogEntry;

/// Internal row type for audit log queries.
#[derive(Debug, sqlx::FromRow)]
struct AuditLogRow {
    id: i32,
    action: String,
    details: String,
    user_id: Option<i32>,
    user_email: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = RepositoryError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(&row.action)
            .map_err(|e| RepositoryError::DataCorruption(format!("audit log {}: {e}", row.id)))?;

        Ok(Self {
            id: AuditLogId::new(row.id),
            action,
            details: row.details,
            user_id: row.user_id.map(UserId::new),
            user_email: row.user_email,
            created_at: row.created_at,
        })
    }
}

/// Append an audit entry on an existing connection.
///
/// Used when the entry must commit or roll back together with the primary
/// operation (e.g., the compensating order deletion).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn record_on(
    conn: &mut PgConnection,
    action: AuditAction,
    details: &str,
    user_id: Option<UserId>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.audit_log (action, details, user_id)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(action.as_str())
    .bind(details)
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Repository for audit log operations.
pub struct AuditLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogRepository<'a> {
    /// Create a new audit log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        action: AuditAction,
        details: &str,
        user_id: Option<UserId>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        record_on(&mut conn, action, details, user_id).await
    }

    /// List the most recent entries (newest first) for the admin view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64) -> Result<Vec<AuditLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT l.id, l.action, l.details, l.user_id,
                   u.email AS user_email,
                   l.created_at
            FROM shop.audit_log l
            LEFT JOIN shop."user" u ON u.id = l.user_id
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}
