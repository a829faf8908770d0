//! Status and action enums for orders and the audit trail.

use serde::{Deserialize, Serialize};

/// Order status.
///
/// An order is a reservation: it starts `PENDING` and is flipped to `PAID`
/// by an admin once the money has been collected in person. Pending orders
/// count toward a user's reservation quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Audit log action kinds.
///
/// Every state-changing admin or checkout operation appends exactly one
/// entry with one of these actions. Entries are immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    OrderCreated,
    OrderUpdated,
    OrderPaid,
    OrderUnpaid,
    OrderDelivered,
    OrderUndelivered,
    OrderDeleted,
}

impl AuditAction {
    /// The action name as stored in the `audit_log.action` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "ORDER_CREATED",
            Self::OrderUpdated => "ORDER_UPDATED",
            Self::OrderPaid => "ORDER_PAID",
            Self::OrderUnpaid => "ORDER_UNPAID",
            Self::OrderDelivered => "ORDER_DELIVERED",
            Self::OrderUndelivered => "ORDER_UNDELIVERED",
            Self::OrderDeleted => "ORDER_DELETED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDER_CREATED" => Ok(Self::OrderCreated),
            "ORDER_UPDATED" => Ok(Self::OrderUpdated),
            "ORDER_PAID" => Ok(Self::OrderPaid),
            "ORDER_UNPAID" => Ok(Self::OrderUnpaid),
            "ORDER_DELIVERED" => Ok(Self::OrderDelivered),
            "ORDER_UNDELIVERED" => Ok(Self::OrderUndelivered),
            "ORDER_DELETED" => Ok(Self::OrderDeleted),
            _ => Err(format!("invalid audit action: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_roundtrip() {
        for status in [OrderStatus::Pending, OrderStatus::Paid] {
            let parsed = OrderStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_invalid() {
        assert!(OrderStatus::from_str("SHIPPED").is_err());
        assert!(OrderStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_order_status_serde_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Paid).unwrap();
        assert_eq!(json, "\"PAID\"");
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
            let parsed = AuditAction::from_str(action.as_str()).unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn test_audit_action_display_matches_column_value() {
        assert_eq!(AuditAction::OrderPaid.to_string(), "ORDER_PAID");
        assert_eq!(AuditAction::OrderUndelivered.to_string(), "ORDER_UNDELIVERED");
    }
}
