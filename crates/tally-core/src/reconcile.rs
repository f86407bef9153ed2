//! # Line Item Reconciliation
//!
//! Merges an incoming item list (from an update request) into the items a
//! sale already has, keyed by line item id.
//!
//! ```text
//! existing: [A, B, C]          incoming: [B', D (no id), A']
//!
//!   A  in both     ──► A updated in place (discount kept)
//!   B  in both     ──► B updated in place
//!   C  only existing ──► dropped
//!   D  only incoming ──► created fresh
//!
//! result (incoming order): [B, D, A]
//! ```
//!
//! The result is what `Sale::update` should be given. The aggregate itself
//! never diffs collections.

use std::collections::HashSet;

use crate::error::{CoreResult, ValidationError};
use crate::line_item::LineItem;
use crate::money::Money;

/// One entry of an incoming item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingLineItem {
    /// Id of the existing line this entry replaces, if any. An id that
    /// matches nothing is treated as a new line.
    pub id: Option<String>,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Builds the replacement line list for `sale_id`.
///
/// Existing lines matched by id keep their identity and discount; their
/// product reference follows the incoming entry. Unmatched entries become
/// new lines.
///
/// ## Errors
/// The first `CoreError::InvalidArgument` raised while updating or creating
/// a line, or `ValidationError::Duplicate` when two entries carry the same
/// id. Nothing is returned partially.
pub fn reconcile_line_items(
    sale_id: &str,
    existing: &[LineItem],
    incoming: &[IncomingLineItem],
) -> CoreResult<Vec<LineItem>> {
    let mut merged = Vec::with_capacity(incoming.len());
    let mut seen = HashSet::new();

    for entry in incoming {
        if let Some(id) = entry.id.as_deref() {
            if !seen.insert(id) {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: id.to_string(),
                }
                .into());
            }
        }

        let matched = entry
            .id
            .as_deref()
            .and_then(|id| existing.iter().find(|item| item.id() == id));

        let line = match matched {
            Some(current) if current.product_id() == entry.product_id => {
                let mut line = current.clone();
                line.update(entry.quantity, entry.unit_price)?;
                line
            }
            Some(current) => {
                // Same line, different product: validate as new, keep the identity
                let fresh = LineItem::create(
                    entry.product_id.clone(),
                    sale_id,
                    entry.quantity,
                    entry.unit_price,
                )?;
                LineItem::restore(
                    current.id().to_string(),
                    fresh.product_id().to_string(),
                    sale_id.to_string(),
                    fresh.quantity(),
                    fresh.unit_price(),
                    current.discount(),
                )
            }
            None => LineItem::create(
                entry.product_id.clone(),
                sale_id,
                entry.quantity,
                entry.unit_price,
            )?,
        };
        merged.push(line);
    }

    Ok(merged)
}
