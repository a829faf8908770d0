//! Product repository: catalog reads and the admin CRUD, including the
//! explicit color/variant reconciliation on update.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use bancarella_core::{ProductColorId, ProductId, VariantId};

use super::RepositoryError;
use crate::models::{ColorInput, Product, ProductColor, ProductInput, ProductVariant,
    ProductWithColors};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    back_image_url: Option<String>,
    active: bool,
    has_variants: bool,
    category: String,
    is_variable_price: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            back_image_url: row.back_image_url,
            active: row.active,
            has_variants: row.has_variants,
            category: row.category,
            is_variable_price: row.is_variable_price,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for color queries.
#[derive(Debug, sqlx::FromRow)]
struct ColorRow {
    id: i32,
    product_id: i32,
    color: String,
    name: String,
}

/// Internal row type for variant queries.
#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i32,
    product_color_id: i32,
    size: String,
    stock: i32,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, back_image_url, \
     active, has_variants, category, is_variable_price, created_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products with their full color/variant trees.
    ///
    /// The public catalog passes `include_inactive = false`; the admin
    /// view sees everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<ProductWithColors>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM shop.product
            WHERE $1 OR active
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        let product_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut colors = self.colors_by_product(&product_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_colors = colors.remove(&row.id).unwrap_or_default();
                ProductWithColors {
                    product: row.into(),
                    colors: product_colors,
                }
            })
            .collect())
    }

    /// Get a product with its color/variant tree.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithColors>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut colors = self.colors_by_product(&[row.id]).await?;
        Ok(Some(ProductWithColors {
            colors: colors.remove(&row.id).unwrap_or_default(),
            product: row.into(),
        }))
    }

    /// Create a product with its nested colors and variants in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (name, description, price, image_url, back_image_url,
                 active, has_variants, category, is_variable_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(&input.back_image_url)
        .bind(input.active.unwrap_or(true))
        .bind(input.has_variants.unwrap_or(true))
        .bind(input.category.as_deref().unwrap_or("Generale"))
        .bind(input.is_variable_price.unwrap_or(false))
        .fetch_one(&mut *tx)
        .await?;

        for color in input.colors.as_deref().unwrap_or_default() {
            let color_id = insert_color(&mut tx, row.id, color).await?;
            for variant in &color.variants {
                sqlx::query(
                    r"
                    INSERT INTO shop.product_variant (product_color_id, size, stock)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(color_id)
                .bind(&variant.size)
                .bind(variant.stock)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update a product's scalar fields and reconcile its color/variant
    /// tree against the submission, all in one transaction.
    ///
    /// Reconciliation is an explicit set difference: persisted colors (and,
    /// per color, variants) absent from the submission are deleted;
    /// submitted entries are updated by id or inserted. Id-less variants
    /// are matched by size within their color before inserting, so resent
    /// forms don't duplicate rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product
            SET name = $2,
                description = $3,
                price = $4,
                image_url = $5,
                back_image_url = $6,
                active = COALESCE($7, active)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(&input.back_image_url)
        .bind(input.active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(colors) = &input.colors {
            reconcile_colors(&mut tx, id, colors).await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete a product. Colors and variants cascade; referencing order
    /// items do not, and the foreign key violation becomes a `Conflict`
    /// suggesting deactivation instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if orders reference the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "Cannot delete product. It might be in use. Try disabling it instead."
                            .to_string(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch color trees (with variants) for a set of products, grouped by
    /// product id.
    async fn colors_by_product(
        &self,
        product_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ProductColor>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let color_rows = sqlx::query_as::<_, ColorRow>(
            r"
            SELECT id, product_id, color, name
            FROM shop.product_color
            WHERE product_id = ANY($1)
            ORDER BY id ASC
            ",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let color_ids: Vec<i32> = color_rows.iter().map(|c| c.id).collect();
        let variant_rows = if color_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, VariantRow>(
                r"
                SELECT id, product_color_id, size, stock
                FROM shop.product_variant
                WHERE product_color_id = ANY($1)
                ORDER BY id ASC
                ",
            )
            .bind(&color_ids)
            .fetch_all(self.pool)
            .await?
        };

        let mut variants: HashMap<i32, Vec<ProductVariant>> = HashMap::new();
        for v in variant_rows {
            variants
                .entry(v.product_color_id)
                .or_default()
                .push(ProductVariant {
                    id: VariantId::new(v.id),
                    size: v.size,
                    stock: v.stock,
                });
        }

        let mut map: HashMap<i32, Vec<ProductColor>> = HashMap::new();
        for c in color_rows {
            map.entry(c.product_id).or_default().push(ProductColor {
                id: ProductColorId::new(c.id),
                color: c.color,
                name: c.name,
                variants: variants.remove(&c.id).unwrap_or_default(),
            });
        }

        Ok(map)
    }
}

/// Insert a color row, returning its id.
async fn insert_color(
    conn: &mut PgConnection,
    product_id: i32,
    color: &ColorInput,
) -> Result<i32, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.product_color (product_id, color, name)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(product_id)
    .bind(&color.color)
    .bind(&color.name)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Reconcile the persisted color/variant tree with the submitted one.
async fn reconcile_colors(
    conn: &mut PgConnection,
    product_id: ProductId,
    colors: &[ColorInput],
) -> Result<(), RepositoryError> {
    let existing = sqlx::query_as::<_, ColorRow>(
        r"
        SELECT id, product_id, color, name
        FROM shop.product_color
        WHERE product_id = $1
        ",
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let incoming_ids: HashSet<i32> = colors
        .iter()
        .filter_map(|c| c.id.map(|id| id.as_i32()))
        .collect();

    // Colors dropped from the submission go away, variants cascading.
    for color in &existing {
        if !incoming_ids.contains(&color.id) {
            sqlx::query(r"DELETE FROM shop.product_color WHERE id = $1")
                .bind(color.id)
                .execute(&mut *conn)
                .await?;
        }
    }

    for color in colors {
        let color_id = if let Some(id) = color.id {
            sqlx::query(
                r"
                UPDATE shop.product_color
                SET color = $2, name = $3
                WHERE id = $1 AND product_id = $4
                ",
            )
            .bind(id)
            .bind(&color.color)
            .bind(&color.name)
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
            id.as_i32()
        } else {
            insert_color(&mut *conn, product_id.as_i32(), color).await?
        };

        reconcile_variants(&mut *conn, color_id, color).await?;
    }

    Ok(())
}

/// Reconcile one color's variants with the submitted list.
async fn reconcile_variants(
    conn: &mut PgConnection,
    color_id: i32,
    color: &ColorInput,
) -> Result<(), RepositoryError> {
    let existing = sqlx::query_as::<_, VariantRow>(
        r"
        SELECT id, product_color_id, size, stock
        FROM shop.product_variant
        WHERE product_color_id = $1
        ",
    )
    .bind(color_id)
    .fetch_all(&mut *conn)
    .await?;

    let incoming_ids: HashSet<i32> = color
        .variants
        .iter()
        .filter_map(|v| v.id.map(|id| id.as_i32()))
        .collect();

    for variant in &existing {
        if !incoming_ids.contains(&variant.id) {
            sqlx::query(r"DELETE FROM shop.product_variant WHERE id = $1")
                .bind(variant.id)
                .execute(&mut *conn)
                .await?;
        }
    }

    for variant in &color.variants {
        if let Some(id) = variant.id {
            sqlx::query(
                r"
                UPDATE shop.product_variant
                SET size = $2, stock = $3
                WHERE id = $1 AND product_color_id = $4
                ",
            )
            .bind(id)
            .bind(&variant.size)
            .bind(variant.stock)
            .bind(color_id)
            .execute(&mut *conn)
            .await?;
        } else {
            // Id-less submissions: match by size so a resent form updates
            // stock instead of duplicating the row.
            let found: Option<i32> = sqlx::query_scalar(
                r"
                SELECT id FROM shop.product_variant
                WHERE product_color_id = $1 AND size = $2
                ",
            )
            .bind(color_id)
            .bind(&variant.size)
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(existing_id) = found {
                sqlx::query(r"UPDATE shop.product_variant SET stock = $2 WHERE id = $1")
                    .bind(existing_id)
                    .bind(variant.stock)
                    .execute(&mut *conn)
                    .await?;
            } else {
                sqlx::query(
                    r"
                    INSERT INTO shop.product_variant (product_color_id, size, stock)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(color_id)
                .bind(&variant.size)
                .bind(variant.stock)
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    Ok(())
}
