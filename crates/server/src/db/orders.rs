//! Order repository: placement transaction, listings, admin updates, and
//! the compensating (stock-restoring) deletion.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bancarella_core::{AuditAction, OrderId, OrderItemId, OrderStatus, UserId, VariantId};

use super::{RepositoryError, audit, stock};
use crate::models::{AdminOrder, Order, OrderItem, OrderItemRequest, OrderWithItems};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total: Decimal,
    status: String,
    delivered: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total: row.total,
            status,
            delivered: row.delivered,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for line item queries (with display labels joined in).
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    variant_id: i32,
    quantity: i32,
    price: Decimal,
    product_name: String,
    color: String,
    size: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            variant_id: VariantId::new(row.variant_id),
            quantity: row.quantity,
            price: row.price,
            product_name: row.product_name,
            color: row.color,
            size: row.size,
        }
    }
}

/// Internal row type for the admin listing (order + owner identity).
#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_email: String,
    user_name: String,
    user_class: Option<String>,
}

const ORDER_COLUMNS: &str = "id, user_id, total, status, delivered, created_at";

const ITEM_SELECT: &str = r"
    SELECT oi.id, oi.order_id, oi.product_variant_id AS variant_id,
           oi.quantity, oi.price,
           p.name AS product_name, c.name AS color, v.size
    FROM shop.order_item oi
    JOIN shop.product_variant v ON v.id = oi.product_variant_id
    JOIN shop.product_color c ON c.id = v.product_color_id
    JOIN shop.product p ON p.id = c.product_id
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sum of quantities across the user's PENDING order items.
    ///
    /// Pure read used by the quota check and the pre-checkout warning
    /// endpoint. Intentionally not serialized against concurrent
    /// placements: the quota is a soft limit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_quantity_for(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)::bigint
            FROM shop.order_item oi
            JOIN shop."order" o ON o.id = oi.order_id
            WHERE o.user_id = $1 AND o.status = 'PENDING'
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Create an order inside one transaction: decrement stock per item
    /// (in request order, each under a row lock), then insert the order and
    /// its line items with price snapshots.
    ///
    /// Any failure rolls the whole transaction back; no partial stock
    /// decrement survives a failed placement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VariantNotFound` or
    /// `RepositoryError::InsufficientStock` from the stock step, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        total: Decimal,
        items: &[OrderItemRequest],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            stock::adjust_stock(&mut tx, item.variant_id, -item.quantity)
                .await
                .map_err(|e| match e {
                    // Surface the cart's own label for the missing variant.
                    RepositoryError::VariantNotFound { variant, item: None } => {
                        RepositoryError::VariantNotFound {
                            variant,
                            item: item.display_name.clone(),
                        }
                    }
                    other => other,
                })?;
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO shop."order" (user_id, total, status, delivered)
            VALUES ($1, $2, 'PENDING', FALSE)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, product_variant_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(row.id)
            .bind(item.variant_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM shop."order" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };

        let mut items = self.items_by_order(&[id.as_i32()]).await?;
        Ok(Some(OrderWithItems {
            items: items.remove(&id.as_i32()).unwrap_or_default(),
            order,
        }))
    }

    /// List a user's orders with items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM shop."order"
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_by_order(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                Ok(OrderWithItems {
                    order: Order::try_from(row)?,
                    items: order_items,
                })
            })
            .collect()
    }

    /// List all orders with owner identity for the admin back-office,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r#"
            SELECT o.id, o.user_id, o.total, o.status, o.delivered, o.created_at,
                   u.email AS user_email, u.name AS user_name, u.class AS user_class
            FROM shop."order" o
            JOIN shop."user" u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.order.id).collect();
        let mut items = self.items_by_order(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.order.id).unwrap_or_default();
                Ok(AdminOrder {
                    order: Order::try_from(row.order)?,
                    user_email: row.user_email,
                    user_name: row.user_name,
                    user_class: row.user_class,
                    items: order_items,
                })
            })
            .collect()
    }

    /// Update status and/or delivered flag. Only supplied fields change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        delivered: Option<bool>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE shop."order"
            SET status = COALESCE($2, status),
                delivered = COALESCE($3, delivered)
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.map(|s| s.to_string()))
        .bind(delivered)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Order::try_from(row)
    }

    /// Delete an order, restoring stock for every line item, inside one
    /// transaction. The `ORDER_DELETED` audit entry commits with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_restoring_stock(
        &self,
        id: OrderId,
        acting_user: Option<UserId>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Existence is checked under the row lock inside the transaction:
        // a concurrent delete of the same order blocks here and then sees
        // the row gone, so only one deletion writes an audit entry.
        let existing: Option<i32> =
            sqlx::query_scalar(r#"SELECT id FROM shop."order" WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let items: Vec<(i32, i32)> = sqlx::query_as(
            r"
            SELECT product_variant_id, quantity
            FROM shop.order_item
            WHERE order_id = $1
            ",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for (variant_id, quantity) in items {
            stock::adjust_stock(&mut tx, VariantId::new(variant_id), quantity).await?;
        }

        sqlx::query(r"DELETE FROM shop.order_item WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r#"DELETE FROM shop."order" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        audit::record_on(
            &mut tx,
            AuditAction::OrderDeleted,
            &format!("Order {id} deleted. Stock restored."),
            acting_user,
        )
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Fetch line items for a set of orders, grouped by order id.
    async fn items_by_order(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "{ITEM_SELECT} WHERE oi.order_id = ANY($1) ORDER BY oi.id ASC"
        ))
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            map.entry(row.order_id).or_default().push(row.into());
        }

        Ok(map)
    }
}
