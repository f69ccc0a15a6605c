//! Notification handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::NotificationRecord;
use crate::services::NotificationService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub marked: i64,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<NotificationRecord>>> {
    let service = NotificationService::new(state.db.clone());
    let notifications = service
        .list(query.unread_only.unwrap_or(false), query.limit.unwrap_or(50))
        .await?;

    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db.clone());
    let unread = service.unread_count().await?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_as_read(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = NotificationService::new(state.db.clone());
    service.mark_as_read(notification_id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(state.db.clone());
    let marked = service.mark_all_as_read().await?;

    Ok(Json(MarkAllReadResponse { marked }))
}
