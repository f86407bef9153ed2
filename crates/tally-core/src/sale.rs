//! # Sale Aggregate
//!
//! The sale header, its line items and the lifecycle rules that tie them
//! together.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   create ──► OPEN ──── complete_checkout ────► CHECKED OUT              │
//! │               │  ▲                                  │                   │
//! │        update │  │ apply_discount_rules             │ cancel            │
//! │               └──┘                                  ▼                   │
//! │               │                                CANCELLED + CHECKED OUT  │
//! │               │ cancel                                                  │
//! │               ▼                                                         │
//! │           CANCELLED ──── complete_checkout ──► InvalidState(Cancelled)  │
//! │                                                                         │
//! │   Both flags only ever move false → true.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line items and events are exposed as slices; the only way to change them
//! is through the methods on [`Sale`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::discount::discount_for_quantity;
use crate::discount::DiscountFailure;
use crate::error::{CoreError, CoreResult, SaleStateError, ValidationError};
use crate::events::SaleEvent;
use crate::line_item::LineItem;
use crate::money::Money;
use crate::validation::validate_sale_number;

#[derive(Debug, Clone)]
pub struct Sale {
    id: String,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_id: String,
    branch_id: String,
    is_cancelled: bool,
    is_checkout_completed: bool,
    line_items: Vec<LineItem>,
    events: Vec<SaleEvent>,
    /// Storage version this instance was loaded at. Zero for a sale that has
    /// never been persisted.
    version: i64,
}

impl Sale {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a new open sale and records a `Created` event.
    ///
    /// Every line item is re-parented to the new sale id.
    ///
    /// ## Errors
    /// `CoreError::InvalidArgument` when the sale number is blank,
    /// `line_items` is empty, or the lines add up past what `Money` holds.
    pub fn create(
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer_id: impl Into<String>,
        branch_id: impl Into<String>,
        line_items: Vec<LineItem>,
    ) -> CoreResult<Self> {
        let sale_number = sale_number.into();
        validate_sale_number(&sale_number)?;
        if line_items.is_empty() {
            return Err(ValidationError::Required {
                field: "line_items".to_string(),
            }
            .into());
        }
        validate_sale_amount(&line_items)?;

        let id = Uuid::new_v4().to_string();
        let mut sale = Self {
            id,
            sale_number,
            sale_date,
            customer_id: customer_id.into(),
            branch_id: branch_id.into(),
            is_cancelled: false,
            is_checkout_completed: false,
            line_items: Vec::new(),
            events: Vec::new(),
            version: 0,
        };
        sale.attach(line_items);
        sale.events.push(SaleEvent::Created {
            sale_id: sale.id.clone(),
            sale_number: sale.sale_number.clone(),
            occurred_at: Utc::now(),
        });
        Ok(sale)
    }

    /// Rebuilds a sale from stored state. No events are recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: String,
        sale_number: String,
        sale_date: DateTime<Utc>,
        customer_id: String,
        branch_id: String,
        is_cancelled: bool,
        is_checkout_completed: bool,
        line_items: Vec<LineItem>,
        version: i64,
    ) -> Self {
        Self {
            id,
            sale_number,
            sale_date,
            customer_id,
            branch_id,
            is_cancelled,
            is_checkout_completed,
            line_items,
            events: Vec::new(),
            version,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Overwrites the header and replaces the whole line item collection.
    ///
    /// Reconciling old and new items is the caller's job (see
    /// [`reconcile_line_items`](crate::reconcile_line_items)). Discounts are
    /// not re-run here.
    pub fn update(
        &mut self,
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer_id: impl Into<String>,
        branch_id: impl Into<String>,
        line_items: Vec<LineItem>,
    ) -> CoreResult<()> {
        let sale_number = sale_number.into();
        validate_sale_number(&sale_number)?;
        validate_sale_amount(&line_items)?;

        self.sale_number = sale_number;
        self.sale_date = sale_date;
        self.customer_id = customer_id.into();
        self.branch_id = branch_id.into();
        self.line_items.clear();
        self.attach(line_items);
        self.events.push(SaleEvent::Modified {
            sale_id: self.id.clone(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Runs the quantity discount policy over every line.
    ///
    /// Lines that pass get their new discount immediately. Lines that fail
    /// keep their previous discount and are reported. The scan never stops
    /// early, and lines updated before a failure stay updated.
    pub fn apply_discount_rules(&mut self) -> Result<(), Vec<DiscountFailure>> {
        let mut failures = Vec::new();

        for item in &mut self.line_items {
            match discount_for_quantity(item.quantity()) {
                Ok(rate) => item.set_discount(rate),
                Err(_) => failures.push(DiscountFailure::new(item.id(), item.quantity())),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Marks the sale as checked out.
    ///
    /// ## Preconditions (first failure wins)
    /// 1. At least one line item
    /// 2. Total strictly greater than zero
    /// 3. Not cancelled
    /// 4. Not already checked out
    pub fn complete_checkout(&mut self) -> CoreResult<()> {
        if self.line_items.is_empty() {
            return Err(CoreError::InvalidState(SaleStateError::NoItems));
        }
        if !self.total().is_positive() {
            return Err(CoreError::InvalidState(SaleStateError::NonPositiveTotal));
        }
        if self.is_cancelled {
            return Err(CoreError::InvalidState(SaleStateError::Cancelled));
        }
        if self.is_checkout_completed {
            return Err(CoreError::InvalidState(SaleStateError::AlreadyCheckedOut));
        }

        self.is_checkout_completed = true;
        Ok(())
    }

    /// Cancels the sale. Calling it again is a no-op and records nothing.
    /// A checked-out sale can still be cancelled.
    pub fn cancel(&mut self) {
        if self.is_cancelled {
            return;
        }
        self.is_cancelled = true;
        self.events.push(SaleEvent::Cancelled {
            sale_id: self.id.clone(),
            occurred_at: Utc::now(),
        });
    }

    pub fn add_line_item(&mut self, mut item: LineItem) {
        item.set_sale_id(&self.id);
        self.line_items.push(item);
    }

    /// Removes the line with `line_item_id`. Returns `false` when there is no
    /// such line.
    pub fn remove_line_item(&mut self, line_item_id: &str) -> bool {
        let before = self.line_items.len();
        self.line_items.retain(|item| item.id() != line_item_id);
        self.line_items.len() != before
    }

    /// Takes every buffered event, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.events)
    }

    fn attach(&mut self, line_items: Vec<LineItem>) {
        for item in line_items {
            self.add_line_item(item);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn is_checkout_completed(&self) -> bool {
        self.is_checkout_completed
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn line_item(&self, line_item_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id() == line_item_id)
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Sum of every line total. `create` and `update` refuse lines whose
    /// gross sum overflows, so saturation only matters for lines attached
    /// through `add_line_item`.
    pub fn total(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(), |sum, item| sum.saturating_add(item.total()))
    }
}

/// Gross amounts of all lines must sum without overflow.
fn validate_sale_amount(line_items: &[LineItem]) -> CoreResult<()> {
    line_items
        .iter()
        .try_fold(Money::zero(), |sum, item| sum.checked_add(item.gross()))
        .map(|_| ())
        .ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "line_items".to_string(),
            }
            .into()
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SaleEventKind;
    use crate::money::DiscountRate;

    fn item(quantity: i64, dollars: i64) -> LineItem {
        LineItem::create("prod-1", "", quantity, Money::from_dollars(dollars)).unwrap()
    }

    fn sale_with(items: Vec<LineItem>) -> Sale {
        Sale::create("S-0001", Utc::now(), "cust-1", "branch-1", items).unwrap()
    }

    #[test]
    fn test_create_records_created_event() {
        let sale = sale_with(vec![item(1, 10)]);

        assert!(!sale.is_cancelled());
        assert!(!sale.is_checkout_completed());
        assert_eq!(sale.version(), 0);
        assert_eq!(sale.events().len(), 1);
        assert_eq!(sale.events()[0].kind(), SaleEventKind::Created);
        assert!(sale.line_items().iter().all(|i| i.sale_id() == sale.id()));
    }

    #[test]
    fn test_create_rejects_blank_number_and_empty_items() {
        let err = Sale::create("  ", Utc::now(), "c", "b", vec![item(1, 10)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let err = Sale::create("S-1", Utc::now(), "c", "b", vec![]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_discount_scenario_mixed_tiers() {
        let mut sale = sale_with(vec![item(5, 100), item(12, 50)]);

        assert!(sale.apply_discount_rules().is_ok());

        let lines = sale.line_items();
        assert_eq!(lines[0].discount(), DiscountRate::TEN_PERCENT);
        assert_eq!(lines[0].total(), Money::from_dollars(450));
        assert_eq!(lines[1].discount(), DiscountRate::TWENTY_PERCENT);
        assert_eq!(lines[1].total(), Money::from_dollars(480));
        assert_eq!(sale.total(), Money::from_dollars(930));
    }

    #[test]
    fn test_discount_rejection_leaves_item_discount_alone() {
        let mut sale = sale_with(vec![item(5, 100), item(21, 100)]);

        let failures = sale.apply_discount_rules().unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].line_item_id, sale.line_items()[1].id());

        // Rejected line: no discount, total still derived from quantity × price
        assert_eq!(sale.line_items()[1].discount(), DiscountRate::NONE);
        assert_eq!(sale.line_items()[1].total(), Money::from_dollars(2100));

        // The passing line keeps its new tier
        assert_eq!(sale.line_items()[0].discount(), DiscountRate::TEN_PERCENT);
        assert_eq!(sale.line_items()[0].total(), Money::from_dollars(450));
    }

    #[test]
    fn test_lines_summing_past_money_range_are_rejected() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        let lines = || {
            vec![
                LineItem::create("prod-1", "", 1, big).unwrap(),
                LineItem::create("prod-2", "", 1, big).unwrap(),
            ]
        };

        let err = Sale::create("S-1", Utc::now(), "c", "b", lines()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidArgument(ValidationError::OutOfRange { .. })
        ));

        let mut sale = sale_with(vec![item(1, 10)]);
        let err = sale.update("S-2", Utc::now(), "c", "b", lines()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert_eq!(sale.sale_number(), "S-0001");
        assert_eq!(sale.total(), Money::from_dollars(10));
    }

    #[test]
    fn test_discount_failures_accumulate_and_are_not_rolled_back() {
        let mut sale = sale_with(vec![item(5, 10), item(30, 10), item(12, 10), item(25, 10)]);

        let failures = sale.apply_discount_rules().unwrap_err();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].quantity, 30);
        assert_eq!(failures[1].quantity, 25);

        // Passing lines before and after the failures keep their new tiers
        assert_eq!(sale.line_items()[0].discount(), DiscountRate::TEN_PERCENT);
        assert_eq!(sale.line_items()[2].discount(), DiscountRate::TWENTY_PERCENT);
    }

    #[test]
    fn test_update_replaces_items_and_records_modified() {
        let mut sale = sale_with(vec![item(1, 10), item(2, 10), item(3, 10)]);
        let replacement = vec![item(4, 20), item(5, 20)];
        let replacement_ids: Vec<String> = replacement.iter().map(|i| i.id().to_string()).collect();

        sale.update("S-0002", Utc::now(), "cust-2", "branch-2", replacement)
            .unwrap();

        assert_eq!(sale.line_items().len(), 2);
        let ids: Vec<&str> = sale.line_items().iter().map(LineItem::id).collect();
        assert_eq!(ids, replacement_ids);
        assert_eq!(sale.sale_number(), "S-0002");
        assert_eq!(sale.customer_id(), "cust-2");
        assert_eq!(sale.events().last().map(SaleEvent::kind), Some(SaleEventKind::Modified));
        // Discounts are only applied on request
        assert!(sale.line_items().iter().all(|i| i.discount().is_zero()));
    }

    #[test]
    fn test_checkout_happy_path() {
        let mut sale = sale_with(vec![item(2, 10)]);
        sale.complete_checkout().unwrap();
        assert!(sale.is_checkout_completed());
    }

    #[test]
    fn test_checkout_requires_items() {
        let mut sale = sale_with(vec![item(2, 10)]);
        let id = sale.line_items()[0].id().to_string();
        assert!(sale.remove_line_item(&id));

        let err = sale.complete_checkout().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(SaleStateError::NoItems)));
        assert!(!sale.is_checkout_completed());
    }

    #[test]
    fn test_checkout_requires_positive_total() {
        let zero = LineItem::restore(
            "item-0".into(),
            "prod-1".into(),
            String::new(),
            1,
            Money::zero(),
            DiscountRate::NONE,
        );
        let mut sale = sale_with(vec![zero]);

        let err = sale.complete_checkout().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(SaleStateError::NonPositiveTotal)));
        assert!(!sale.is_checkout_completed());
    }

    #[test]
    fn test_checkout_rejected_after_cancel() {
        let mut sale = sale_with(vec![item(2, 10)]);
        sale.cancel();

        let err = sale.complete_checkout().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(SaleStateError::Cancelled)));
        assert!(!sale.is_checkout_completed());
    }

    #[test]
    fn test_checkout_twice_is_rejected() {
        let mut sale = sale_with(vec![item(2, 10)]);
        sale.complete_checkout().unwrap();

        let err = sale.complete_checkout().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(SaleStateError::AlreadyCheckedOut)));
        assert!(sale.is_checkout_completed());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut sale = sale_with(vec![item(2, 10)]);
        sale.drain_events();

        sale.cancel();
        sale.cancel();

        assert!(sale.is_cancelled());
        let cancelled = sale
            .events()
            .iter()
            .filter(|e| e.kind() == SaleEventKind::Cancelled)
            .count();
        assert_eq!(cancelled, 1);
    }

    #[test]
    fn test_cancel_after_checkout_keeps_both_flags() {
        let mut sale = sale_with(vec![item(2, 10)]);
        sale.complete_checkout().unwrap();
        sale.cancel();

        assert!(sale.is_cancelled());
        assert!(sale.is_checkout_completed());
    }

    #[test]
    fn test_add_and_remove_line_items() {
        let mut sale = sale_with(vec![item(1, 10)]);
        let extra = item(2, 5);
        let extra_id = extra.id().to_string();

        sale.add_line_item(extra);
        assert_eq!(sale.line_items().len(), 2);
        assert_eq!(sale.line_item(&extra_id).map(LineItem::sale_id), Some(sale.id()));

        assert!(sale.remove_line_item(&extra_id));
        assert!(!sale.remove_line_item(&extra_id));
        assert_eq!(sale.line_items().len(), 1);
    }

    #[test]
    fn test_drain_events_empties_buffer() {
        let mut sale = sale_with(vec![item(1, 10)]);
        sale.cancel();

        let drained = sale.drain_events();
        assert_eq!(drained.len(), 2);
        assert!(sale.events().is_empty());
    }

    #[test]
    fn test_restore_records_no_events() {
        let sale = Sale::restore(
            "sale-1".into(),
            "S-1".into(),
            Utc::now(),
            "c".into(),
            "b".into(),
            true,
            false,
            vec![],
            3,
        );
        assert!(sale.events().is_empty());
        assert_eq!(sale.version(), 3);
        assert!(sale.is_cancelled());
    }
}
