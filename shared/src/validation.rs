//! Validation helpers for purchase orders
//!
//! Pure functions so that order arithmetic and input checks are usable (and
//! testable) without a database.

use rust_decimal::Decimal;

/// One submitted line item of an order-creation request.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub quantity: i32,
    pub unit_cost: Decimal,
}

/// Validate the line items of an order-creation request.
pub fn validate_line_items(items: &[LineItem]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("At least one item is required");
    }
    for item in items {
        if item.quantity <= 0 {
            return Err("Item quantity must be positive");
        }
        if item.unit_cost < Decimal::ZERO {
            return Err("Item unit cost cannot be negative");
        }
    }
    Ok(())
}

/// Total amount of an order: sum of `quantity * unit_cost`, rounded to two
/// decimal places.
pub fn order_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_cost * Decimal::from(item.quantity))
        .sum::<Decimal>()
        .round_dp(2)
}

/// Order number shape: `ORD-YYYYMMDD-NNNN`.
pub fn is_valid_order_number(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    s.starts_with("ORD-")
        && bytes[12] == b'-'
        && s[4..12].bytes().all(|b| b.is_ascii_digit())
        && s[13..].bytes().all(|b| b.is_ascii_digit())
}
