//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use bancarella_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{OptionalUser, RequireAdmin};
use crate::models::{ProductInput, ProductWithColors};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/products
///
/// Inactive products are only visible to admins who explicitly ask.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductWithColors>>> {
    let is_admin = user.is_some_and(|u| u.is_admin);
    let include_inactive = is_admin && query.include_inactive;

    let products = ProductRepository::new(state.pool())
        .list(include_inactive)
        .await?;

    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductWithColors>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// POST /api/products (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductWithColors>)> {
    validate_input(&input)?;

    let repo = ProductRepository::new(state.pool());
    let product = repo.create(&input).await?;

    tracing::info!(product_id = %product.id, admin = %admin.email, "product created");

    // Re-read with the color tree so the response matches GET
    let full = repo
        .get(product.id)
        .await?
        .ok_or_else(|| AppError::Internal("created product vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(full)))
}

/// PUT /api/products/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ProductWithColors>> {
    validate_input(&input)?;

    let repo = ProductRepository::new(state.pool());
    repo.update(id, &input).await?;

    tracing::info!(product_id = %id, admin = %admin.email, "product updated");

    let full = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(full))
}

/// DELETE /api/products/{id} (admin)
///
/// Deletion fails with 400 when the product is referenced by order items;
/// disabling (`active = false`) is the supported path for retiring a
/// product with history.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool()).delete(id).await?;

    tracing::info!(product_id = %id, admin = %admin.email, "product deleted");

    Ok(Json(json!({ "ok": true })))
}

fn validate_input(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if input.price < rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest("Price cannot be negative".to_string()));
    }
    if let Some(colors) = &input.colors {
        for color in colors {
            for variant in &color.variants {
                if variant.stock < 0 {
                    return Err(AppError::BadRequest(
                        "Stock cannot be negative".to_string(),
                    ));
                }
            }
        }
    }
    Ok(())
}
