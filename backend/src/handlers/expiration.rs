//! Expiration sweep admin handlers
//!
//! The scheduler lives in application state; these endpoints expose its
//! status and controls plus an on-demand sweep and the expiring-soon view.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expiration::{ExpiringBatch, SchedulerStatus, SweepSummary};
use crate::services::ExpirationService;
use crate::AppState;

use super::require_admin;

#[derive(Debug, Deserialize)]
pub struct ExpiringSoonQuery {
    pub days: Option<i64>,
}

/// GET /api/expiration/status
pub async fn scheduler_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SchedulerStatus>> {
    require_admin(&user)?;

    Ok(Json(state.scheduler.status()))
}

/// POST /api/expiration/start
pub async fn start_scheduler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SchedulerStatus>> {
    require_admin(&user)?;

    state.scheduler.start();
    Ok(Json(state.scheduler.status()))
}

/// POST /api/expiration/stop
pub async fn stop_scheduler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SchedulerStatus>> {
    require_admin(&user)?;

    state.scheduler.stop();
    Ok(Json(state.scheduler.status()))
}

/// POST /api/expiration/run
pub async fn run_sweep(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SweepSummary>> {
    require_admin(&user)?;

    let summary = state.scheduler.run_once().await?;
    Ok(Json(summary))
}

/// GET /api/expiration/expiring-soon
pub async fn expiring_soon(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ExpiringSoonQuery>,
) -> AppResult<Json<Vec<ExpiringBatch>>> {
    let days = query
        .days
        .unwrap_or(state.config.sweep.expiring_soon_days);

    let service = ExpirationService::new(state.db.clone());
    let batches = service.get_batches_expiring_within(days).await?;

    Ok(Json(batches))
}
