//! Product handlers
//!
//! Product CRUD lives with the catalog; the engine only exposes stock
//! views plus a manual correction endpoint for admins.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::product::ProductRecord;
use crate::services::ProductService;
use crate::AppState;

use super::require_admin;

#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    /// Signed stock delta; the result is clamped at zero
    pub delta: i32,
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db.clone());
    let product = service.get_product(product_id).await?;

    Ok(Json(product))
}

/// GET /api/products/low-stock
pub async fn list_low_stock(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<ProductRecord>>> {
    let service = ProductService::new(state.db.clone());
    let products = service.list_low_stock().await?;

    Ok(Json(products))
}

/// POST /api/products/:id/adjust-stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<ProductRecord>> {
    require_admin(&user)?;

    let service = ProductService::new(state.db.clone());
    let product = service.adjust_stock(product_id, input.delta).await?;

    tracing::info!(%product_id, delta = input.delta, stock = product.current_stock,
        low_stock = product.is_low_stock(), "manual stock adjustment");

    Ok(Json(product))
}
