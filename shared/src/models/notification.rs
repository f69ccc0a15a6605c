//! Notification kinds

use serde::{Deserialize, Serialize};

/// Kind of alert recorded in the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    BudgetAlert,
    ExpiryWarning,
    CompletedTask,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::LowStock => "low_stock",
            NotificationKind::BudgetAlert => "budget_alert",
            NotificationKind::ExpiryWarning => "expiry_warning",
            NotificationKind::CompletedTask => "completed_task",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low_stock" => Some(NotificationKind::LowStock),
            "budget_alert" => Some(NotificationKind::BudgetAlert),
            "expiry_warning" => Some(NotificationKind::ExpiryWarning),
            "completed_task" => Some(NotificationKind::CompletedTask),
            _ => None,
        }
    }
}
