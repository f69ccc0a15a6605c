//! Notification service for in-app alerts
//!
//! The order engine and the expiration sweep only ever create records here
//! (fire-and-forget); the dashboard reads them and toggles the read flag.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::NotificationKind;

/// Notification service for the in-app notification sink
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// Stored notification
#[derive(Debug, Clone, serde::Serialize, FromRow)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub action_url: Option<String>,
    pub recipient_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationInput {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub recipient_role: Option<String>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a notification
    pub async fn record(&self, input: CreateNotificationInput) -> AppResult<NotificationRecord> {
        let notification = sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notifications (kind, title, message, action_url, recipient_role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, title, message, is_read, action_url, recipient_role,
                      created_at, updated_at
            "#,
        )
        .bind(input.kind.as_str())
        .bind(&input.title)
        .bind(&input.message)
        .bind(&input.action_url)
        .bind(&input.recipient_role)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    /// List notifications, newest first
    pub async fn list(&self, unread_only: bool, limit: i64) -> AppResult<Vec<NotificationRecord>> {
        let notifications = if unread_only {
            sqlx::query_as::<_, NotificationRecord>(
                r#"
                SELECT id, kind, title, message, is_read, action_url, recipient_role,
                       created_at, updated_at
                FROM notifications
                WHERE is_read = FALSE
                ORDER BY created_at DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, NotificationRecord>(
                r#"
                SELECT id, kind, title, message, is_read, action_url, recipient_role,
                       created_at, updated_at
                FROM notifications
                ORDER BY created_at DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.db)
            .await?
        };

        Ok(notifications)
    }

    /// Get unread notification count
    pub async fn unread_count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE is_read = FALSE",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark a notification as read
    pub async fn mark_as_read(&self, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(notification_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }

        Ok(())
    }

    /// Mark all notifications as read
    pub async fn mark_all_as_read(&self) -> AppResult<i64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() WHERE is_read = FALSE",
        )
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() as i64)
    }
}

// ============================================================================
// Notification Builders
// ============================================================================

/// Expiry warning for an elapsed batch
pub fn batch_expired_notification(
    product_name: &str,
    product_id: Uuid,
    expired_quantity: i32,
) -> CreateNotificationInput {
    CreateNotificationInput {
        kind: NotificationKind::ExpiryWarning,
        title: format!("Product Expired: {}", product_name),
        message: format!(
            "A batch of '{}' has passed its expiration date. Expired quantity: {}",
            product_name, expired_quantity
        ),
        action_url: Some(format!("/products/{}", product_id)),
        recipient_role: None,
    }
}

/// Expiry warning referencing the product's adjusted stock
pub fn stock_adjusted_notification(
    product_name: &str,
    product_id: Uuid,
    expired_quantity: i32,
    current_stock: i32,
) -> CreateNotificationInput {
    CreateNotificationInput {
        kind: NotificationKind::ExpiryWarning,
        title: format!("Stock Adjusted: {}", product_name),
        message: format!(
            "Removed {} expired units of '{}'. Current stock: {}",
            expired_quantity, product_name, current_stock
        ),
        action_url: Some(format!("/products/{}", product_id)),
        recipient_role: None,
    }
}

/// Low-stock alert for a product below its minimum threshold
pub fn low_stock_notification(
    product_name: &str,
    product_id: Uuid,
    current_stock: i32,
    min_qty: i32,
) -> CreateNotificationInput {
    CreateNotificationInput {
        kind: NotificationKind::LowStock,
        title: format!("{} Stock Alert", product_name),
        message: format!(
            "Product '{}' is below minimum stock level. Current stock: {}, minimum: {}",
            product_name, current_stock, min_qty
        ),
        action_url: Some(format!("/products/{}", product_id)),
        recipient_role: None,
    }
}
