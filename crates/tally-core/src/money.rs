//! # Money Module
//!
//! Integer-cent money and the discount rate applied to sale lines.
//!
//! ## Line Total Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price (cents) × quantity ──► gross                                │
//! │                                                                         │
//! │  gross × discount_bps / 10000   ──► discount amount (round half up)     │
//! │                                                                         │
//! │  gross − discount amount        ──► line total                          │
//! │                                                                         │
//! │  Example: $100.00 × 5 = $500.00, 10% (1000 bps) = $50.00 → $450.00      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floating point never touches an amount. `DiscountRate::fraction` exists
//! for display only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Signed so that intermediate results (a discount amount subtracted from a
/// gross) never need special casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a value from cents.
    ///
    /// ```rust
    /// use tally_core::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a value from whole dollars.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole-dollar part, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Cents part, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Strictly greater than zero. Checkout and price validation use this.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64`
    /// bounds. Line items are validated with
    /// [`checked_multiply_quantity`](Money::checked_multiply_quantity) so a
    /// stored line never reaches the bound.
    ///
    /// ```rust
    /// use tally_core::Money;
    ///
    /// let gross = Money::from_cents(5_000).multiply_quantity(12);
    /// assert_eq!(gross.cents(), 60_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit in cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Returns this amount with `rate` taken off.
    ///
    /// The discount amount is rounded half up to the cent before it is
    /// subtracted, so `$0.05` at 10% loses `$0.01` rather than nothing.
    ///
    /// ```rust
    /// use tally_core::{DiscountRate, Money};
    ///
    /// let gross = Money::from_cents(60_000); // $600.00
    /// let net = gross.apply_discount(DiscountRate::from_bps(2000)); // 20% off
    /// assert_eq!(net.cents(), 48_000);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        // gross × bps can exceed i64 even when gross itself fits
        let discount_amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount expressed in basis points (1000 = 10%).
///
/// Only the discount policy produces non-zero rates; there is no public way
/// to attach an arbitrary rate to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Full price.
    pub const NONE: DiscountRate = DiscountRate(0);
    /// 10% off.
    pub const TEN_PERCENT: DiscountRate = DiscountRate(1000);
    /// 20% off.
    pub const TWENTY_PERCENT: DiscountRate = DiscountRate(2000);

    /// Creates a rate from basis points. Values above 10000 are clamped.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > 10000 {
            DiscountRate(10000)
        } else {
            DiscountRate(bps)
        }
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a fraction in `[0, 1]`. Display only.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10000.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::NONE
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(45_000).to_string(), "$450.00");
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_apply_discount_tiers() {
        let gross = Money::from_dollars(500);
        assert_eq!(gross.apply_discount(DiscountRate::NONE), gross);
        assert_eq!(gross.apply_discount(DiscountRate::TEN_PERCENT).cents(), 45_000);
        assert_eq!(gross.apply_discount(DiscountRate::TWENTY_PERCENT).cents(), 40_000);
    }

    #[test]
    fn test_apply_discount_rounds_half_up() {
        // 10% of 5 cents is 0.5 cents, rounded up to 1
        assert_eq!(Money::from_cents(5).apply_discount(DiscountRate::TEN_PERCENT).cents(), 4);
        // 10% of 4 cents is 0.4 cents, rounded down to 0
        assert_eq!(Money::from_cents(4).apply_discount(DiscountRate::TEN_PERCENT).cents(), 4);
    }

    #[test]
    fn test_discount_rate_views() {
        assert_eq!(DiscountRate::TWENTY_PERCENT.fraction(), 0.2);
        assert_eq!(DiscountRate::TEN_PERCENT.to_string(), "10.00%");
        assert_eq!(DiscountRate::from_bps(20_000).bps(), 10_000);
        assert!(DiscountRate::default().is_zero());
    }

    #[test]
    fn test_overflow_is_detected_not_wrapped() {
        let price = Money::from_cents(500_000_000_000_000_000);

        assert_eq!(price.checked_multiply_quantity(20), None);
        assert_eq!(
            price.checked_multiply_quantity(2),
            Some(Money::from_cents(1_000_000_000_000_000_000))
        );
        assert_eq!(price.multiply_quantity(20).cents(), i64::MAX);

        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(max.saturating_add(Money::from_cents(1)), max);

        // The widened discount step stays exact near the top of the range
        assert_eq!(
            max.apply_discount(DiscountRate::TWENTY_PERCENT).cents(),
            i64::MAX - i64::MAX / 5
        );
    }

    #[test]
    fn test_positive_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_cents(-1).is_positive());
    }
}
