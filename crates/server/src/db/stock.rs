//! Stock adjustment primitive and public stock lookup.
//!
//! `adjust_stock` is the single mutation path for `product_variant.stock`.
//! It runs on the caller's connection so multi-item operations (checkout,
//! compensating deletion) stay all-or-nothing inside one transaction.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool, Row};

use bancarella_core::VariantId;

use super::RepositoryError;

/// Atomically adjust a variant's stock by `delta` (negative to reserve,
/// positive to restore).
///
/// Re-reads the row under `FOR UPDATE` so concurrent adjustments of the
/// same variant serialize: two checkouts can never jointly take more than
/// the available stock. The caller must hold an open transaction; this
/// function is not a standalone transaction.
///
/// Returns the new stock value.
///
/// # Errors
///
/// Returns `RepositoryError::VariantNotFound` if the variant does not exist,
/// `RepositoryError::InsufficientStock` if a decrement would drive stock
/// negative (no mutation is performed), or `RepositoryError::Database` for
/// other database errors.
pub async fn adjust_stock(
    conn: &mut PgConnection,
    variant_id: VariantId,
    delta: i32,
) -> Result<i32, RepositoryError> {
    // The row lock acquired here is what gives the no-oversell guarantee.
    let row = sqlx::query(
        r"
        SELECT v.stock, c.color, v.size
        FROM shop.product_variant v
        JOIN shop.product_color c ON c.id = v.product_color_id
        WHERE v.id = $1
        FOR UPDATE OF v
        ",
    )
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::VariantNotFound {
        variant: variant_id,
        item: None,
    })?;

    let stock: i32 = row.try_get("stock")?;

    if delta < 0 && stock + delta < 0 {
        let color: String = row.try_get("color")?;
        let size: String = row.try_get("size")?;
        return Err(RepositoryError::InsufficientStock {
            variant: format!("{color} - {size}"),
            available: stock,
            requested: -delta,
        });
    }

    let new_stock: i32 = sqlx::query_scalar(
        r"
        UPDATE shop.product_variant
        SET stock = stock + $2
        WHERE id = $1
        RETURNING stock
        ",
    )
    .bind(variant_id)
    .bind(delta)
    .fetch_one(&mut *conn)
    .await?;

    Ok(new_stock)
}

/// Current stock for a set of variants, keyed by variant id.
///
/// Read-only and unauthenticated; used by the cart to pre-validate before
/// checkout. Unknown ids are simply absent from the map.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn check_stock(
    pool: &PgPool,
    variant_ids: &[VariantId],
) -> Result<HashMap<VariantId, i32>, RepositoryError> {
    let ids: Vec<i32> = variant_ids.iter().map(VariantId::as_i32).collect();

    let rows = sqlx::query(
        r"
        SELECT id, stock
        FROM shop.product_variant
        WHERE id = ANY($1)
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let id: VariantId = row.try_get("id")?;
        let stock: i32 = row.try_get("stock")?;
        map.insert(id, stock);
    }

    Ok(map)
}
