//! Product catalog domain types.
//!
//! A product owns colors; a color owns variants. The variant is the unit of
//! inventory: a (size, stock) pair whose stock is the only value the
//! checkout transaction ever mutates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bancarella_core::{ProductColorId, ProductId, VariantId};

/// A catalog entry (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Catalog price. Captured into order items at checkout time.
    pub price: Decimal,
    /// Front image URL.
    pub image_url: Option<String>,
    /// Back image URL.
    pub back_image_url: Option<String>,
    /// Inactive products are hidden from the public catalog.
    pub active: bool,
    /// Whether the product is sold per color/size variant.
    pub has_variants: bool,
    /// Category label for grouping in the storefront.
    pub category: String,
    /// Whether the price is indicative (pay-what-you-want style entries).
    pub is_variable_price: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// A color grouping under a product, with its variants.
#[derive(Debug, Clone, Serialize)]
pub struct ProductColor {
    /// Unique color ID.
    pub id: ProductColorId,
    /// Color value (e.g., "#1a1a1a" or "Navy").
    pub color: String,
    /// Human-readable color name.
    pub name: String,
    /// Size variants available in this color.
    pub variants: Vec<ProductVariant>,
}

/// The unit of inventory: a specific size of a specific color.
///
/// Invariant: `stock >= 0` at all times, enforced by every mutation path
/// (and backed by a CHECK constraint).
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    /// Unique variant ID.
    pub id: VariantId,
    /// Size label (e.g., "M", "XL").
    pub size: String,
    /// Units currently available for reservation.
    pub stock: i32,
}

/// A product together with its full color/variant tree.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithColors {
    #[serde(flatten)]
    pub product: Product,
    pub colors: Vec<ProductColor>,
}

/// Input shape for creating or updating a product.
///
/// On update, `colors` is reconciled against the persisted tree: colors and
/// variants absent from the submission are deleted, submitted ones are
/// updated (by id) or inserted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub back_image_url: Option<String>,
    /// Defaults to true on create.
    pub active: Option<bool>,
    /// Defaults to true on create.
    pub has_variants: Option<bool>,
    /// Defaults to "Generale" on create.
    pub category: Option<String>,
    /// Defaults to false on create.
    pub is_variable_price: Option<bool>,
    /// On update, omitting this field leaves the color tree untouched;
    /// an empty list deletes every color.
    pub colors: Option<Vec<ColorInput>>,
}

/// Submitted color: an `id` marks an existing row to update.
#[derive(Debug, Clone, Deserialize)]
pub struct ColorInput {
    pub id: Option<ProductColorId>,
    pub color: String,
    pub name: String,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

/// Submitted variant: an `id` marks an existing row to update; id-less
/// submissions are matched by size within the color before inserting.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantInput {
    pub id: Option<VariantId>,
    pub size: String,
    pub stock: i32,
}
