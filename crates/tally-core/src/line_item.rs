//! # Line Item
//!
//! One product on a sale: quantity, unit price and the discount the policy
//! granted. A line item only ever lives inside a [`Sale`](crate::Sale); the
//! aggregate hands out shared references and routes every change through
//! its own methods.
//!
//! ## Total Invariant
//! ```text
//! total = quantity × unit_price × (1 − discount)
//! ```
//! The total has no backing field. It is computed from the three inputs on
//! every read, so no mutation can leave it stale.

use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::{DiscountRate, Money};
use crate::validation::{
    validate_line_amount, validate_quantity, validate_required, validate_unit_price,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: String,
    product_id: String,
    sale_id: String,
    quantity: i64,
    unit_price: Money,
    discount: DiscountRate,
}

impl LineItem {
    /// Creates a new line item with no discount.
    ///
    /// ## Errors
    /// `CoreError::InvalidArgument` when `product_id` is blank,
    /// `quantity`/`unit_price` is not strictly positive, or their product
    /// does not fit in cents.
    ///
    /// ```rust
    /// use tally_core::{LineItem, Money};
    ///
    /// let item = LineItem::create("prod-1", "sale-1", 2, Money::from_cents(1_500)).unwrap();
    /// assert_eq!(item.total().cents(), 3_000);
    /// assert!(LineItem::create("prod-1", "sale-1", 0, Money::from_cents(1_500)).is_err());
    /// ```
    pub fn create(
        product_id: impl Into<String>,
        sale_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> CoreResult<Self> {
        let product_id = product_id.into();
        validate_required("product_id", &product_id)?;
        validate_quantity(quantity)?;
        validate_unit_price(unit_price)?;
        validate_line_amount(quantity, unit_price)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            product_id,
            sale_id: sale_id.into(),
            quantity,
            unit_price,
            discount: DiscountRate::NONE,
        })
    }

    /// Rebuilds a line item from stored state. No validation is applied.
    pub fn restore(
        id: String,
        product_id: String,
        sale_id: String,
        quantity: i64,
        unit_price: Money,
        discount: DiscountRate,
    ) -> Self {
        Self {
            id,
            product_id,
            sale_id,
            quantity,
            unit_price,
            discount,
        }
    }

    /// Changes quantity and price, keeping whatever discount is in place.
    /// Nothing changes when validation fails.
    pub fn update(&mut self, quantity: i64, unit_price: Money) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_unit_price(unit_price)?;
        validate_line_amount(quantity, unit_price)?;

        self.quantity = quantity;
        self.unit_price = unit_price;
        Ok(())
    }

    pub(crate) fn set_discount(&mut self, discount: DiscountRate) {
        self.discount = discount;
    }

    pub(crate) fn set_sale_id(&mut self, sale_id: &str) {
        self.sale_id = sale_id.to_string();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn sale_id(&self) -> &str {
        &self.sale_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn discount(&self) -> DiscountRate {
        self.discount
    }

    /// Quantity × unit price, before discount.
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Quantity × unit price × (1 − discount).
    pub fn total(&self) -> Money {
        self.gross().apply_discount(self.discount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
