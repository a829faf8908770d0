//! Stock check route handler.

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::Deserialize;

use bancarella_core::VariantId;

use crate::db::stock;
use crate::error::Result;
use crate::state::AppState;

/// Stock check request body.
#[derive(Debug, Deserialize)]
pub struct StockCheckRequest {
    pub variant_ids: Vec<VariantId>,
}

/// POST /api/stock/check
///
/// Returns `{variant_id: stock}` for every known id in the request. The
/// result is advisory: stock can change between this read and checkout,
/// which re-validates under row locks.
pub async fn check(
    State(state): State<AppState>,
    Json(body): Json<StockCheckRequest>,
) -> Result<Json<HashMap<VariantId, i32>>> {
    let stock = stock::check_stock(state.pool(), &body.variant_ids).await?;
    Ok(Json(stock))
}
