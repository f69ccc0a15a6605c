//! The purchase order status graph

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The wire values are a client contract: `"not assigned"` keeps its space,
/// the rest are snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "not assigned")]
    NotAssigned,
    #[serde(rename = "assigned")]
    Assigned,
    #[serde(rename = "pending_review")]
    PendingReview,
    #[serde(rename = "verified")]
    Verified,
    #[serde(rename = "paid")]
    Paid,
    #[serde(rename = "canceled")]
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::NotAssigned,
        OrderStatus::Assigned,
        OrderStatus::PendingReview,
        OrderStatus::Verified,
        OrderStatus::Paid,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotAssigned => "not assigned",
            OrderStatus::Assigned => "assigned",
            OrderStatus::PendingReview => "pending_review",
            OrderStatus::Verified => "verified",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not assigned" => Some(OrderStatus::NotAssigned),
            "assigned" => Some(OrderStatus::Assigned),
            "pending_review" => Some(OrderStatus::PendingReview),
            "verified" => Some(OrderStatus::Verified),
            "paid" => Some(OrderStatus::Paid),
            "canceled" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Canceled)
    }

    /// Whether an order in this status may still be canceled.
    ///
    /// Cancellation is rejected once inventory has been credited (`verified`
    /// and later): there is no stock-reversal rule, so the transition is
    /// simply not offered.
    pub fn is_cancelable(&self) -> bool {
        matches!(
            self,
            OrderStatus::NotAssigned | OrderStatus::Assigned | OrderStatus::PendingReview
        )
    }

    /// The declared status graph.
    ///
    /// `not assigned -> assigned -> pending_review -> verified -> paid`,
    /// with `canceled` reachable from the three pre-verification states.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::NotAssigned, OrderStatus::Assigned) => true,
            (OrderStatus::Assigned, OrderStatus::PendingReview) => true,
            (OrderStatus::PendingReview, OrderStatus::Verified) => true,
            (OrderStatus::Verified, OrderStatus::Paid) => true,
            (from, OrderStatus::Canceled) => from.is_cancelable(),
            _ => false,
        }
    }

    /// The only transition that credits product stock.
    pub fn applies_inventory(&self, next: OrderStatus) -> bool {
        *self == OrderStatus::PendingReview && next == OrderStatus::Verified
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("confirmed"), None);
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for terminal in [OrderStatus::Paid, OrderStatus::Canceled] {
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn inventory_applies_only_on_verify() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let applies = from.applies_inventory(to);
                assert_eq!(
                    applies,
                    from == OrderStatus::PendingReview && to == OrderStatus::Verified
                );
            }
        }
    }
}
