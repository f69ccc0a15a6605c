//! Expiration sweep tests
//!
//! Tests for the expiration sweep logic including:
//! - Batch eligibility (elapsed date, live remaining quantity)
//! - Idempotent claim semantics
//! - Stock clamping at zero
//! - Low-stock alert triggering after a sweep

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// ============================================================================
// Sweep Simulation
// ============================================================================

/// In-memory model of a batch as the sweep sees it
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    expiration_date: Option<NaiveDate>,
    remaining_qty: i32,
    is_expired: bool,
    expired_quantity: i32,
}

/// A batch is eligible when its date has elapsed and it still holds stock
fn is_eligible(batch: &Batch, today: NaiveDate) -> bool {
    matches!(batch.expiration_date, Some(date) if date <= today)
        && !batch.is_expired
        && batch.remaining_qty > 0
}

/// Claim a batch the way the store does: conditional on it still being
/// live, zeroing the remaining quantity. Returns the quantity to remove
/// from product stock, or None when the batch was already claimed.
fn claim_batch(batch: &mut Batch) -> Option<i32> {
    if batch.is_expired || batch.remaining_qty <= 0 {
        return None;
    }
    let expired = batch.remaining_qty;
    batch.is_expired = true;
    batch.expired_quantity = expired;
    batch.remaining_qty = 0;
    Some(expired)
}

/// Stock decrement clamped at zero
fn decrement_stock(current_stock: i32, quantity: i32) -> i32 {
    (current_stock - quantity).max(0)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
}

/// Accepted look-ahead for the expiring-soon view: whole days in 1..=365,
/// narrowed to i32 only after the range check
fn window_days(days: i64) -> Option<i32> {
    (1..=365).contains(&days).then(|| days as i32)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn live_batch(days_from_today: i64, remaining_qty: i32) -> Batch {
        Batch {
            expiration_date: Some(today() + Duration::days(days_from_today)),
            remaining_qty,
            is_expired: false,
            expired_quantity: 0,
        }
    }

    #[test]
    fn test_elapsed_batch_is_eligible() {
        assert!(is_eligible(&live_batch(-1, 5), today()));
        // Expiring today counts as elapsed
        assert!(is_eligible(&live_batch(0, 5), today()));
    }

    #[test]
    fn test_future_batch_not_eligible() {
        assert!(!is_eligible(&live_batch(1, 5), today()));
        assert!(!is_eligible(&live_batch(30, 5), today()));
    }

    #[test]
    fn test_batch_without_date_not_eligible() {
        let batch = Batch {
            expiration_date: None,
            remaining_qty: 5,
            is_expired: false,
            expired_quantity: 0,
        };
        assert!(!is_eligible(&batch, today()));
    }

    #[test]
    fn test_drained_batch_not_eligible() {
        assert!(!is_eligible(&live_batch(-1, 0), today()));
    }

    #[test]
    fn test_already_expired_batch_not_eligible() {
        let mut batch = live_batch(-1, 5);
        batch.is_expired = true;
        assert!(!is_eligible(&batch, today()));
    }

    /// A claimed batch records its quantity and holds nothing afterward
    #[test]
    fn test_claim_moves_quantity() {
        let mut batch = live_batch(-1, 7);
        let removed = claim_batch(&mut batch);

        assert_eq!(removed, Some(7));
        assert!(batch.is_expired);
        assert_eq!(batch.remaining_qty, 0);
        assert_eq!(batch.expired_quantity, 7);
    }

    /// A second claim on the same batch is a no-op
    #[test]
    fn test_claim_is_idempotent() {
        let mut batch = live_batch(-1, 7);

        assert_eq!(claim_batch(&mut batch), Some(7));
        assert_eq!(claim_batch(&mut batch), None);
        assert_eq!(batch.expired_quantity, 7);
    }

    #[test]
    fn test_stock_decrement() {
        assert_eq!(decrement_stock(10, 4), 6);
        assert_eq!(decrement_stock(10, 10), 0);
    }

    /// Removing more than is on hand clamps at zero
    #[test]
    fn test_stock_never_negative() {
        assert_eq!(decrement_stock(3, 10), 0);
        assert_eq!(decrement_stock(0, 5), 0);
    }

    /// Two batches of the same product expiring in one run
    #[test]
    fn test_multiple_batches_same_product() {
        let mut batches = vec![live_batch(-2, 4), live_batch(-1, 6)];
        let mut stock = 15;

        for batch in &mut batches {
            if is_eligible(batch, today()) {
                if let Some(removed) = claim_batch(batch) {
                    stock = decrement_stock(stock, removed);
                }
            }
        }

        assert_eq!(stock, 5);
        assert!(batches.iter().all(|b| b.is_expired && b.remaining_qty == 0));
    }

    /// Low-stock alert fires when the sweep pushes stock below the minimum
    #[test]
    fn test_low_stock_alert_after_sweep() {
        let min_qty = 10;
        let stock_after = decrement_stock(12, 5);

        assert_eq!(stock_after, 7);
        assert!(stock_after < min_qty);

        let stock_after_high = decrement_stock(30, 5);
        assert!(stock_after_high >= min_qty);
    }

    /// The look-ahead window rejects non-positive, oversized and
    /// truncation-prone values
    #[test]
    fn test_window_days_bounds() {
        assert_eq!(window_days(1), Some(1));
        assert_eq!(window_days(7), Some(7));
        assert_eq!(window_days(365), Some(365));

        assert_eq!(window_days(0), None);
        assert_eq!(window_days(-3), None);
        assert_eq!(window_days(366), None);
        // Would wrap if cast without the range check
        assert_eq!(window_days(i64::from(i32::MAX) + 7), None);
    }

    /// Expiring-soon window: live batches strictly in the future, within
    /// N days. Elapsed batches belong to the sweep, not the warning view.
    #[test]
    fn test_expiring_soon_window() {
        let window_days = 7i64;
        let in_window = |batch: &Batch| {
            matches!(
                batch.expiration_date,
                Some(date) if date > today() && date <= today() + Duration::days(window_days)
            ) && !batch.is_expired
                && batch.remaining_qty > 0
        };

        assert!(in_window(&live_batch(3, 5)));
        assert!(in_window(&live_batch(7, 5)));
        assert!(!in_window(&live_batch(8, 5)));
        assert!(!in_window(&live_batch(0, 5)));
        assert!(!in_window(&live_batch(-1, 5)));
        assert!(!in_window(&live_batch(3, 0)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn batch_strategy() -> impl Strategy<Value = Batch> {
        (
            prop::option::of(-365i64..=365),
            0i32..=1000,
            prop::bool::ANY,
        )
            .prop_map(|(offset, remaining_qty, is_expired)| Batch {
                expiration_date: offset.map(|d| today() + Duration::days(d)),
                remaining_qty,
                is_expired,
                expired_quantity: 0,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Claiming a batch twice never yields quantity twice
        #[test]
        fn prop_claim_exactly_once(mut batch in batch_strategy()) {
            let first = claim_batch(&mut batch);
            let second = claim_batch(&mut batch);

            if first.is_some() {
                prop_assert!(second.is_none());
            }
        }

        /// A claimed batch always ends up drained and marked
        #[test]
        fn prop_claimed_batch_drained(mut batch in batch_strategy()) {
            if let Some(removed) = claim_batch(&mut batch) {
                prop_assert!(removed > 0);
                prop_assert!(batch.is_expired);
                prop_assert_eq!(batch.remaining_qty, 0);
                prop_assert_eq!(batch.expired_quantity, removed);
            }
        }

        /// Stock is never negative after any decrement
        #[test]
        fn prop_stock_non_negative(
            stock in 0i32..=10000,
            quantity in 0i32..=20000
        ) {
            prop_assert!(decrement_stock(stock, quantity) >= 0);
        }

        /// When stock covers the quantity the decrement is exact
        #[test]
        fn prop_decrement_exact_when_covered(
            quantity in 0i32..=10000,
            surplus in 0i32..=10000
        ) {
            let stock = quantity + surplus;
            prop_assert_eq!(decrement_stock(stock, quantity), surplus);
        }

        /// Eligibility requires an elapsed date and live stock
        #[test]
        fn prop_eligibility_conditions(batch in batch_strategy()) {
            let eligible = is_eligible(&batch, today());

            if eligible {
                prop_assert!(!batch.is_expired);
                prop_assert!(batch.remaining_qty > 0);
                prop_assert!(batch.expiration_date.is_some());
            }

            if batch.is_expired || batch.remaining_qty <= 0 || batch.expiration_date.is_none() {
                prop_assert!(!eligible);
            }
        }

        /// A full sweep over any set of batches conserves quantity:
        /// stock removed equals the sum of claimed quantities
        #[test]
        fn prop_sweep_conserves_quantity(
            mut batches in prop::collection::vec(batch_strategy(), 0..20),
            initial_stock in 0i32..=100000
        ) {
            let mut stock = initial_stock;
            let mut removed_total = 0i64;

            for batch in &mut batches {
                if is_eligible(batch, today()) {
                    if let Some(removed) = claim_batch(batch) {
                        removed_total += removed as i64;
                        stock = decrement_stock(stock, removed);
                    }
                }
            }

            prop_assert!(stock >= 0);
            // With the clamp, stock drops by at most the removed total
            prop_assert!((initial_stock - stock) as i64 <= removed_total);

            // Running the same sweep again changes nothing
            let before = (stock, batches.clone());
            for batch in &mut batches {
                if is_eligible(batch, today()) {
                    if let Some(removed) = claim_batch(batch) {
                        stock = decrement_stock(stock, removed);
                    }
                }
            }
            prop_assert_eq!((stock, batches), before);
        }
    }
}
