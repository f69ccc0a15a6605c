//! HTTP request handlers

pub mod expiration;
pub mod health;
pub mod notification;
pub mod order;
pub mod product;

pub use health::health_check;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Reject non-admin callers on admin-only endpoints
pub(crate) fn require_admin(user: &AuthUser) -> AppResult<()> {
    if !user.is_admin {
        return Err(AppError::Unauthorized("Admin access required".to_string()));
    }
    Ok(())
}
