//! # Read Models
//!
//! Serializable snapshots of a sale for API responses. Amounts are cents;
//! `discount` is the fraction in `[0, 1]` for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::line_item::LineItem;
use crate::sale::Sale;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleView {
    pub id: String,
    pub sale_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub customer_id: String,
    pub branch_id: String,
    pub is_cancelled: bool,
    pub is_checkout_completed: bool,
    pub total_cents: i64,
    pub items: Vec<LineItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemView {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    pub discount: f64,
    pub total_cents: i64,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id().to_string(),
            sale_id: item.sale_id().to_string(),
            product_id: item.product_id().to_string(),
            quantity: item.quantity(),
            unit_price_cents: item.unit_price().cents(),
            discount_bps: item.discount().bps(),
            discount: item.discount().fraction(),
            total_cents: item.total().cents(),
        }
    }
}

impl From<&Sale> for SaleView {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id().to_string(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_id: sale.customer_id().to_string(),
            branch_id: sale.branch_id().to_string(),
            is_cancelled: sale.is_cancelled(),
            is_checkout_completed: sale.is_checkout_completed(),
            total_cents: sale.total().cents(),
            items: sale.line_items().iter().map(LineItemView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_view_reflects_discounted_totals() {
        let item = LineItem::create("prod-1", "", 12, Money::from_dollars(50)).unwrap();
        let mut sale = Sale::create("S-1", Utc::now(), "c", "b", vec![item]).unwrap();
        sale.apply_discount_rules().unwrap();

        let view = SaleView::from(&sale);
        assert_eq!(view.total_cents, 48_000);
        assert_eq!(view.items[0].discount_bps, 2000);
        assert_eq!(view.items[0].discount, 0.2);
        assert_eq!(view.items[0].sale_id, sale.id());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["total_cents"], 48_000);
    }
}
