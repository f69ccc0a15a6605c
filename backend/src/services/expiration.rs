//! Expiration sweep
//!
//! Finds order batches whose expiration date has elapsed, marks them
//! expired, zeroes their remaining quantity and removes that quantity from
//! the product's stock. The claim of a batch and the stock decrement happen
//! in a single transaction, with the claim itself a conditional update, so
//! a batch is processed exactly once even if two sweeps overlap.
//!
//! The sweep runs on a fixed interval through [`ExpirationScheduler`] and
//! can also be triggered on demand from the admin surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::notification::{
    batch_expired_notification, low_stock_notification, stock_adjusted_notification,
    NotificationService,
};

/// Expiration sweep service
#[derive(Clone)]
pub struct ExpirationService {
    db: PgPool,
    notifications: NotificationService,
}

/// Result of one sweep run
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub candidates: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub ran_at: DateTime<Utc>,
}

/// Outcome of expiring one batch
#[derive(Debug, Clone, Serialize)]
pub struct ExpiredBatchOutcome {
    pub batch_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub expired_quantity: i32,
    pub stock_after: i32,
}

/// Batch whose expiration date falls within the warning window
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpiringBatch {
    pub batch_id: Uuid,
    pub order_id: Uuid,
    pub order_number: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub remaining_qty: i32,
    pub expiration_date: NaiveDate,
}

#[derive(FromRow)]
struct ClaimedBatch {
    product_id: Uuid,
    expired_quantity: i32,
}

#[derive(FromRow)]
struct AdjustedProduct {
    name: String,
    current_stock: i32,
    min_qty: i32,
}

impl ExpirationService {
    /// Create a new ExpirationService instance
    pub fn new(db: PgPool) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self { db, notifications }
    }

    /// Run one sweep over all elapsed, unprocessed batches.
    ///
    /// Each batch is handled independently; a failure on one batch is
    /// logged and does not abort the rest of the run.
    pub async fn process_expired_batches(&self) -> AppResult<SweepSummary> {
        let candidate_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM order_items
            WHERE expiration_date <= CURRENT_DATE
              AND is_expired = FALSE
              AND remaining_qty > 0
            ORDER BY expiration_date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let candidates = candidate_ids.len();
        let mut processed = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for batch_id in candidate_ids {
            match self.handle_expired_batch(batch_id).await {
                Ok(Some(outcome)) => {
                    processed += 1;
                    tracing::info!(
                        batch_id = %outcome.batch_id,
                        product = %outcome.product_name,
                        expired_quantity = outcome.expired_quantity,
                        stock_after = outcome.stock_after,
                        "expired batch processed"
                    );
                }
                // Claimed by a concurrent sweep between the scan and the claim
                Ok(None) => skipped += 1,
                Err(err) => {
                    failed += 1;
                    tracing::error!(%batch_id, error = %err, "failed to process expired batch");
                }
            }
        }

        let summary = SweepSummary {
            candidates,
            processed,
            skipped,
            failed,
            ran_at: Utc::now(),
        };

        tracing::info!(
            candidates = summary.candidates,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "expiration sweep completed"
        );

        Ok(summary)
    }

    /// Expire a single batch and decrement the product's stock.
    ///
    /// The claim is conditional on the batch still being live, so calling
    /// this twice for the same batch decrements stock only once. Returns
    /// `None` when the batch was already processed.
    pub async fn handle_expired_batch(
        &self,
        batch_id: Uuid,
    ) -> AppResult<Option<ExpiredBatchOutcome>> {
        let mut tx = self.db.begin().await?;

        let claimed = sqlx::query_as::<_, ClaimedBatch>(
            r#"
            UPDATE order_items
            SET is_expired = TRUE,
                expired_quantity = remaining_qty,
                remaining_qty = 0
            WHERE id = $1 AND is_expired = FALSE AND remaining_qty > 0
            RETURNING product_id, expired_quantity
            "#,
        )
        .bind(batch_id)
        .fetch_optional(&mut *tx)
        .await?;

        let claimed = match claimed {
            Some(claimed) => claimed,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        // Stock never goes negative even if it was adjusted out-of-band
        let product = sqlx::query_as::<_, AdjustedProduct>(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock - $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING name, current_stock, min_qty
            "#,
        )
        .bind(claimed.product_id)
        .bind(claimed.expired_quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let outcome = ExpiredBatchOutcome {
            batch_id,
            product_id: claimed.product_id,
            product_name: product.name.clone(),
            expired_quantity: claimed.expired_quantity,
            stock_after: product.current_stock,
        };

        // Notifications are best-effort; the stock adjustment is already durable
        self.emit_notifications(&outcome, product.current_stock, product.min_qty)
            .await;

        Ok(Some(outcome))
    }

    async fn emit_notifications(
        &self,
        outcome: &ExpiredBatchOutcome,
        current_stock: i32,
        min_qty: i32,
    ) {
        let inputs = [
            Some(batch_expired_notification(
                &outcome.product_name,
                outcome.product_id,
                outcome.expired_quantity,
            )),
            Some(stock_adjusted_notification(
                &outcome.product_name,
                outcome.product_id,
                outcome.expired_quantity,
                current_stock,
            )),
            (current_stock < min_qty).then(|| {
                low_stock_notification(
                    &outcome.product_name,
                    outcome.product_id,
                    current_stock,
                    min_qty,
                )
            }),
        ];

        for input in inputs.into_iter().flatten() {
            if let Err(err) = self.notifications.record(input).await {
                tracing::warn!(
                    batch_id = %outcome.batch_id,
                    error = %err,
                    "failed to record expiration notification"
                );
            }
        }
    }

    /// Live batches whose expiration date falls within the next `days` days
    pub async fn get_batches_expiring_within(&self, days: i64) -> AppResult<Vec<ExpiringBatch>> {
        if !(1..=365).contains(&days) {
            return Err(AppError::Validation {
                field: "days".to_string(),
                message: "Days must be between 1 and 365".to_string(),
            });
        }

        let batches = sqlx::query_as::<_, ExpiringBatch>(
            r#"
            SELECT oi.id AS batch_id, oi.order_id, o.order_number, oi.product_id,
                   p.name AS product_name, oi.remaining_qty, oi.expiration_date
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE oi.is_expired = FALSE
              AND oi.remaining_qty > 0
              AND oi.expiration_date > CURRENT_DATE
              AND oi.expiration_date <= CURRENT_DATE + $1::INT
            ORDER BY oi.expiration_date ASC
            "#,
        )
        .bind(days as i32) // in 1..=365, checked above
        .fetch_all(&self.db)
        .await?;

        Ok(batches)
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Scheduler status as reported to the admin surface
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_secs: u64,
}

/// Periodic driver for the expiration sweep.
///
/// Held once in application state; `start` is idempotent and `stop` aborts
/// the background task. The sweep itself stays safe to run concurrently, so
/// an overlapping `run_once` during a scheduled tick is harmless.
pub struct ExpirationScheduler {
    service: ExpirationService,
    interval: Duration,
    running: AtomicBool,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ExpirationScheduler {
    /// Create a new scheduler around the sweep service
    pub fn new(service: ExpirationService, interval: Duration) -> Self {
        Self {
            service,
            interval,
            running: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// Start the periodic sweep. No-op when already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let service = self.service.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // First tick fires immediately; skip it so startup stays quiet
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(err) = service.process_expired_batches().await {
                    tracing::error!(error = %err, "scheduled expiration sweep failed");
                }
            }
        });

        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(handle);
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "expiration scheduler started");
    }

    /// Stop the periodic sweep. No-op when not running.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Ok(mut slot) = self.task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }

        tracing::info!("expiration scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            interval_secs: self.interval.as_secs(),
        }
    }

    /// Run one sweep immediately, independent of the schedule
    pub async fn run_once(&self) -> AppResult<SweepSummary> {
        self.service.process_expired_batches().await
    }
}
