//! # Discount Policy
//!
//! Quantity-based discount tiers for a single sale line.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────┐
//! │ Quantity             │ Outcome                                  │
//! ├──────────────────────┼──────────────────────────────────────────┤
//! │ q > 20               │ rejected, line left untouched            │
//! │ 10 ≤ q ≤ 20          │ 20%                                      │
//! │ 4 ≤ q < 10           │ 10%                                      │
//! │ q < 4                │ 0%                                       │
//! └──────────────────────┴──────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::DiscountRate;
use crate::MAX_ITEM_QUANTITY;

/// Human-readable reason attached to a rejected line.
pub const QUANTITY_LIMIT_MESSAGE: &str = "cannot sell more than 20 units of the same product";

/// A line item the discount policy refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountFailure {
    /// Always `"quantity"`; kept so clients can key errors by field.
    pub field: String,
    /// Id of the offending line item.
    pub line_item_id: String,
    pub quantity: i64,
    pub message: String,
}

impl DiscountFailure {
    pub fn new(line_item_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            field: "quantity".to_string(),
            line_item_id: line_item_id.into(),
            quantity,
            message: QUANTITY_LIMIT_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for DiscountFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line item {} (quantity {}): {}",
            self.line_item_id, self.quantity, self.message
        )
    }
}

/// Returns the discount tier for `quantity`.
///
/// The error carries no line id; `Sale::apply_discount_rules` fills it in.
///
/// ```rust
/// use tally_core::{discount_for_quantity, DiscountRate};
///
/// assert_eq!(discount_for_quantity(3), Ok(DiscountRate::NONE));
/// assert_eq!(discount_for_quantity(4), Ok(DiscountRate::TEN_PERCENT));
/// assert_eq!(discount_for_quantity(20), Ok(DiscountRate::TWENTY_PERCENT));
/// assert!(discount_for_quantity(21).is_err());
/// ```
pub fn discount_for_quantity(quantity: i64) -> Result<DiscountRate, DiscountFailure> {
    match quantity {
        q if q > MAX_ITEM_QUANTITY => Err(DiscountFailure::new("", q)),
        10..=MAX_ITEM_QUANTITY => Ok(DiscountRate::TWENTY_PERCENT),
        4..=9 => Ok(DiscountRate::TEN_PERCENT),
        _ => Ok(DiscountRate::NONE),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        for q in 1..=3 {
            assert_eq!(discount_for_quantity(q), Ok(DiscountRate::NONE), "q = {q}");
        }
        for q in 4..=9 {
            assert_eq!(discount_for_quantity(q), Ok(DiscountRate::TEN_PERCENT), "q = {q}");
        }
        for q in 10..=20 {
            assert_eq!(discount_for_quantity(q), Ok(DiscountRate::TWENTY_PERCENT), "q = {q}");
        }
    }

    #[test]
    fn test_above_limit_is_rejected() {
        let failure = discount_for_quantity(21).unwrap_err();
        assert_eq!(failure.quantity, 21);
        assert_eq!(failure.field, "quantity");
        assert_eq!(failure.message, QUANTITY_LIMIT_MESSAGE);

        assert!(discount_for_quantity(1_000).is_err());
    }
}
