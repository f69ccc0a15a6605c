//! Order lifecycle tests
//!
//! Tests for the purchase order state machine including:
//! - Legal and illegal status transitions
//! - Terminal state behavior
//! - Order total calculation
//! - Order number format

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::OrderStatus;
use shared::validation::{is_valid_order_number, order_total, validate_line_items, LineItem};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Mirror of the store's COALESCE on the order total: an explicit override
/// replaces the computed total verbatim, absence keeps the computed one.
fn stored_total(computed: Decimal, override_total: Option<Decimal>) -> Decimal {
    override_total.unwrap_or(computed)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The canonical forward path
    #[test]
    fn test_happy_path_transitions() {
        let path = [
            OrderStatus::NotAssigned,
            OrderStatus::Assigned,
            OrderStatus::PendingReview,
            OrderStatus::Verified,
            OrderStatus::Paid,
        ];

        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    /// Cancellation is only legal before verification
    #[test]
    fn test_cancellation_window() {
        assert!(OrderStatus::NotAssigned.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::Assigned.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::PendingReview.can_transition_to(OrderStatus::Canceled));

        assert!(!OrderStatus::Verified.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Canceled));
    }

    /// Terminal states allow no further transitions
    #[test]
    fn test_terminal_states_are_dead_ends() {
        for terminal in [OrderStatus::Paid, OrderStatus::Canceled] {
            assert!(terminal.is_terminal());
            for target in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    /// Skipping a step is never legal
    #[test]
    fn test_no_stage_skipping() {
        assert!(!OrderStatus::NotAssigned.can_transition_to(OrderStatus::PendingReview));
        assert!(!OrderStatus::NotAssigned.can_transition_to(OrderStatus::Verified));
        assert!(!OrderStatus::NotAssigned.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Assigned.can_transition_to(OrderStatus::Verified));
        assert!(!OrderStatus::Assigned.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::PendingReview.can_transition_to(OrderStatus::Paid));
    }

    /// Moving backward is never legal
    #[test]
    fn test_no_backward_transitions() {
        assert!(!OrderStatus::Assigned.can_transition_to(OrderStatus::NotAssigned));
        assert!(!OrderStatus::PendingReview.can_transition_to(OrderStatus::Assigned));
        assert!(!OrderStatus::Verified.can_transition_to(OrderStatus::PendingReview));
    }

    /// Inventory is applied on exactly one edge of the graph
    #[test]
    fn test_inventory_applied_only_on_verify() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let applies = from.applies_inventory(to);
                let expected = from == OrderStatus::PendingReview && to == OrderStatus::Verified;
                assert_eq!(applies, expected, "{} -> {}", from, to);
            }
        }
    }

    /// Status strings round-trip through parse
    #[test]
    fn test_status_string_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("confirmed"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    /// Order total: 3 x 10.50 + 2 x 13.00 = 57.50
    #[test]
    fn test_order_total_example() {
        let items = vec![
            LineItem {
                quantity: 3,
                unit_cost: dec("10.50"),
            },
            LineItem {
                quantity: 2,
                unit_cost: dec("13.00"),
            },
        ];

        assert_eq!(order_total(&items), dec("57.50"));
    }

    /// Empty item lists are rejected
    #[test]
    fn test_empty_items_rejected() {
        assert!(validate_line_items(&[]).is_err());
    }

    /// Non-positive quantities are rejected
    #[test]
    fn test_non_positive_quantity_rejected() {
        for quantity in [0, -1, -100] {
            let items = vec![LineItem {
                quantity,
                unit_cost: dec("5.00"),
            }];
            assert!(validate_line_items(&items).is_err());
        }
    }

    /// Negative unit costs are rejected, zero is allowed
    #[test]
    fn test_unit_cost_bounds() {
        let negative = vec![LineItem {
            quantity: 1,
            unit_cost: dec("-0.01"),
        }];
        assert!(validate_line_items(&negative).is_err());

        let free = vec![LineItem {
            quantity: 1,
            unit_cost: Decimal::ZERO,
        }];
        assert!(validate_line_items(&free).is_ok());
    }

    /// An explicit total override replaces the computed total verbatim
    #[test]
    fn test_total_override_replaces_computed() {
        let items = vec![
            LineItem {
                quantity: 3,
                unit_cost: dec("10.50"),
            },
            LineItem {
                quantity: 2,
                unit_cost: dec("13.00"),
            },
        ];
        let computed = order_total(&items);
        assert_eq!(computed, dec("57.50"));

        // The bill says 60.00; the stored total becomes exactly that
        assert_eq!(stored_total(computed, Some(dec("60.00"))), dec("60.00"));

        // Verbatim means no re-rounding of the override
        assert_eq!(stored_total(computed, Some(dec("61.999"))), dec("61.999"));
    }

    /// Without an override the computed total is retained
    #[test]
    fn test_total_retained_without_override() {
        let computed = dec("57.50");
        assert_eq!(stored_total(computed, None), computed);
    }

    /// Order number format: ORD-YYYYMMDD-NNNN
    #[test]
    fn test_order_number_format() {
        assert!(is_valid_order_number("ORD-20260823-1042"));
        assert!(is_valid_order_number("ORD-20251231-9999"));

        assert!(!is_valid_order_number("ORD-2026823-1042"));
        assert!(!is_valid_order_number("PO-20260823-1042"));
        assert!(!is_valid_order_number("ORD-20260823-042"));
        assert!(!is_valid_order_number("ORD-20260823-10425"));
        assert!(!is_valid_order_number(""));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::NotAssigned),
            Just(OrderStatus::Assigned),
            Just(OrderStatus::PendingReview),
            Just(OrderStatus::Verified),
            Just(OrderStatus::Paid),
            Just(OrderStatus::Canceled),
        ]
    }

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..=10000
    }

    fn unit_cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 10000.00
    }

    fn line_items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
        prop::collection::vec(
            (quantity_strategy(), unit_cost_strategy()).prop_map(|(quantity, unit_cost)| {
                LineItem {
                    quantity,
                    unit_cost,
                }
            }),
            1..20,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A status never transitions to itself
        #[test]
        fn prop_no_self_transitions(status in status_strategy()) {
            prop_assert!(!status.can_transition_to(status));
        }

        /// Terminal states have no outgoing edges
        #[test]
        fn prop_terminal_states_closed(
            from in status_strategy(),
            to in status_strategy()
        ) {
            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
        }

        /// The cancelable set and the cancel edge agree
        #[test]
        fn prop_cancelable_matches_cancel_edge(status in status_strategy()) {
            prop_assert_eq!(
                status.is_cancelable(),
                status.can_transition_to(OrderStatus::Canceled)
            );
        }

        /// Inventory application implies a legal transition
        #[test]
        fn prop_inventory_edge_is_legal(
            from in status_strategy(),
            to in status_strategy()
        ) {
            if from.applies_inventory(to) {
                prop_assert!(from.can_transition_to(to));
            }
        }

        /// Status serialization round-trips
        #[test]
        fn prop_status_round_trip(status in status_strategy()) {
            prop_assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }

        /// Valid line items always validate, and the total matches the sum
        #[test]
        fn prop_order_total_is_item_sum(items in line_items_strategy()) {
            prop_assert!(validate_line_items(&items).is_ok());

            let expected: Decimal = items
                .iter()
                .map(|item| Decimal::from(item.quantity) * item.unit_cost)
                .sum();

            prop_assert_eq!(order_total(&items), expected.round_dp(2));
        }

        /// The order total is never negative
        #[test]
        fn prop_order_total_non_negative(items in line_items_strategy()) {
            prop_assert!(order_total(&items) >= Decimal::ZERO);
        }

        /// With an override present the stored total is the override verbatim;
        /// without one the computed total is retained
        #[test]
        fn prop_total_override_verbatim(
            items in line_items_strategy(),
            override_total in prop::option::of(unit_cost_strategy())
        ) {
            let computed = order_total(&items);
            let stored = stored_total(computed, override_total);

            match override_total {
                Some(override_total) => prop_assert_eq!(stored, override_total),
                None => prop_assert_eq!(stored, computed),
            }
        }

        /// Any list containing a bad quantity fails validation
        #[test]
        fn prop_bad_quantity_rejected(
            mut items in line_items_strategy(),
            bad_quantity in -1000i32..=0,
            position in 0usize..20
        ) {
            let idx = position % items.len();
            items[idx].quantity = bad_quantity;
            prop_assert!(validate_line_items(&items).is_err());
        }
    }
}

// ============================================================================
// Transition Simulation
// ============================================================================

#[cfg(test)]
mod transition_simulation {
    use super::*;

    /// Simulate a conditional transition the way the store applies it:
    /// the update succeeds only when the stored status matches the
    /// expected one, and at most one of two racing calls can win.
    fn try_transition(
        stored: &mut OrderStatus,
        expected: OrderStatus,
        target: OrderStatus,
    ) -> bool {
        if *stored == expected && expected.can_transition_to(target) {
            *stored = target;
            true
        } else {
            false
        }
    }

    #[test]
    fn test_double_assign_single_winner() {
        let mut stored = OrderStatus::NotAssigned;

        let first = try_transition(&mut stored, OrderStatus::NotAssigned, OrderStatus::Assigned);
        let second = try_transition(&mut stored, OrderStatus::NotAssigned, OrderStatus::Assigned);

        assert!(first);
        assert!(!second);
        assert_eq!(stored, OrderStatus::Assigned);
    }

    #[test]
    fn test_double_verify_single_winner() {
        let mut stored = OrderStatus::PendingReview;

        let mut applied = 0;
        for _ in 0..2 {
            if try_transition(&mut stored, OrderStatus::PendingReview, OrderStatus::Verified) {
                applied += 1;
            }
        }

        // Stock would be credited once, never twice
        assert_eq!(applied, 1);
        assert_eq!(stored, OrderStatus::Verified);
    }

    #[test]
    fn test_cancel_after_verify_rejected() {
        let mut stored = OrderStatus::Verified;
        let canceled = try_transition(&mut stored, OrderStatus::Verified, OrderStatus::Canceled);

        assert!(!canceled);
        assert_eq!(stored, OrderStatus::Verified);
    }

    #[test]
    fn test_full_lifecycle_simulation() {
        let mut stored = OrderStatus::NotAssigned;

        assert!(try_transition(&mut stored, OrderStatus::NotAssigned, OrderStatus::Assigned));
        assert!(try_transition(&mut stored, OrderStatus::Assigned, OrderStatus::PendingReview));
        assert!(try_transition(&mut stored, OrderStatus::PendingReview, OrderStatus::Verified));
        assert!(try_transition(&mut stored, OrderStatus::Verified, OrderStatus::Paid));

        assert!(stored.is_terminal());
    }
}
