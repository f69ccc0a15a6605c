//! Order lifecycle handlers
//!
//! Thin layer over [`OrderService`]: extract the caller, parse query and
//! body input, delegate. Assignment, verification and payment are
//! admin-only; staff see only their own assigned orders.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::order::{
    AssignOrderInput, CancelOrderInput, CreateOrderInput, OrderAnalytics, OrderFilter, OrderPage,
    OrderStats, OrderWithItems, SubmitForReviewInput, UpdateOrderInput, VerifyOrderInput,
};
use crate::services::OrderService;
use crate::AppState;
use shared::types::SortOrder;

use super::require_admin;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub staff_id: Option<Uuid>,
    /// Substring match on the order number
    pub search: Option<String>,
    /// Comma-separated supplier IDs
    pub supplier_ids: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
}

fn parse_supplier_ids(raw: &str) -> AppResult<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::Validation {
                field: "supplier_ids".to_string(),
                message: format!("Invalid supplier ID '{}'", s),
            })
        })
        .collect()
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderWithItems>)> {
    require_admin(&user)?;

    let service = OrderService::new(state.db.clone());
    let order = service.create_order(input).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<OrderPage>> {
    let supplier_ids = query
        .supplier_ids
        .as_deref()
        .map(parse_supplier_ids)
        .transpose()?;

    let filter = OrderFilter {
        status: query.status,
        staff_id: query.staff_id,
        order_number: query.search,
        supplier_ids,
    };

    let service = OrderService::new(state.db.clone());
    let page = service
        .list_orders(
            &user,
            filter,
            query.sort_by,
            query.order.unwrap_or_default(),
            query.page.unwrap_or(1),
            query.limit.unwrap_or(10),
        )
        .await?;

    Ok(Json(page))
}

/// GET /api/orders/stats
pub async fn get_order_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<OrderStats>> {
    let service = OrderService::new(state.db.clone());
    let stats = service.get_order_stats(&user).await?;

    Ok(Json(stats))
}

/// GET /api/orders/analytics
pub async fn get_order_analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<OrderAnalytics>> {
    require_admin(&user)?;

    let period = query.period.unwrap_or_else(|| "month".to_string());
    let service = OrderService::new(state.db.clone());
    let analytics = service.get_order_analytics(&period).await?;

    Ok(Json(analytics))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db.clone());
    let order = service.get_order(order_id, &user).await?;

    Ok(Json(order))
}

/// PATCH /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    // Staff may only touch their own assigned orders
    let service = OrderService::new(state.db.clone());
    service.get_order(order_id, &user).await?;
    let order = service.update_order(order_id, input).await?;

    Ok(Json(order))
}

/// POST /api/orders/:id/assign
pub async fn assign_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<AssignOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_admin(&user)?;

    let service = OrderService::new(state.db.clone());
    let order = service.assign_order(order_id, input).await?;

    Ok(Json(order))
}

/// POST /api/orders/:id/submit-review
pub async fn submit_for_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<SubmitForReviewInput>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db.clone());
    service.get_order(order_id, &user).await?;
    let order = service.submit_for_review(order_id, input).await?;

    Ok(Json(order))
}

/// POST /api/orders/:id/verify
pub async fn verify_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    input: Option<Json<VerifyOrderInput>>,
) -> AppResult<Json<OrderWithItems>> {
    require_admin(&user)?;

    let input = input.map(|Json(input)| input).unwrap_or_default();
    let service = OrderService::new(state.db.clone());
    let order = service.verify_order(order_id, input).await?;

    Ok(Json(order))
}

/// POST /api/orders/:id/pay
pub async fn mark_paid(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    require_admin(&user)?;

    let service = OrderService::new(state.db.clone());
    let order = service.mark_paid(order_id).await?;

    Ok(Json(order))
}

/// POST /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    input: Option<Json<CancelOrderInput>>,
) -> AppResult<Json<OrderWithItems>> {
    require_admin(&user)?;

    let input = input.map(|Json(input)| input).unwrap_or_default();
    let service = OrderService::new(state.db.clone());
    let order = service.cancel_order(order_id, input).await?;

    Ok(Json(order))
}
