//! # Request and Response Shapes
//!
//! JSON bodies accepted and returned by the sales routes. Money travels as
//! integer cents.
//!
//! Request validation collects every problem before anything reaches the
//! domain, so a client sees all of its mistakes in one 400.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{ApiError, FieldError};
use tally_core::validation::{
    validate_line_amount, validate_quantity, validate_required, validate_sale_number,
    validate_unit_price, validate_uuid,
};
use tally_core::{IncomingLineItem, Money};

// =============================================================================
// Envelope
// =============================================================================

/// Success envelope. Errors use the same outer shape, see `ApiError`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// One product line in a create request.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct SaleProductRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub sale_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub customer_id: String,
    pub branch_id: String,
    pub products: Vec<SaleProductRequest>,
}

/// One product line in an update request. `id` names the existing line it
/// replaces; omit it to add a line.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UpdateSaleProductRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UpdateSaleRequest {
    pub id: String,
    pub sale_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub customer_id: String,
    pub branch_id: String,
    pub products: Vec<UpdateSaleProductRequest>,
}

impl CreateSaleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = header_errors(&self.sale_number, &self.customer_id, &self.branch_id);

        if self.products.is_empty() {
            errors.push(FieldError::new("products", "at least one product is required"));
        }
        for (index, product) in self.products.iter().enumerate() {
            product_errors(
                index,
                &product.product_id,
                product.quantity,
                product.unit_price_cents,
                &mut errors,
            );
        }

        finish(errors)
    }
}

impl UpdateSaleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = header_errors(&self.sale_number, &self.customer_id, &self.branch_id);

        if self.products.is_empty() {
            errors.push(FieldError::new("products", "at least one product is required"));
        }
        let mut seen_ids = HashSet::new();
        for (index, product) in self.products.iter().enumerate() {
            if let Some(id) = &product.id {
                if let Err(e) = validate_uuid("id", id) {
                    errors.push(FieldError::new(format!("products[{}].id", index), e.to_string()));
                } else if !seen_ids.insert(id.as_str()) {
                    errors.push(FieldError::new(
                        format!("products[{}].id", index),
                        format!("line item id '{}' appears more than once", id),
                    ));
                }
            }
            product_errors(
                index,
                &product.product_id,
                product.quantity,
                product.unit_price_cents,
                &mut errors,
            );
        }

        finish(errors)
    }

    /// Lines in the form `reconcile_line_items` expects.
    pub fn incoming_items(&self) -> Vec<IncomingLineItem> {
        self.products
            .iter()
            .map(|p| IncomingLineItem {
                id: p.id.clone(),
                product_id: p.product_id.clone(),
                quantity: p.quantity,
                unit_price: Money::from_cents(p.unit_price_cents),
            })
            .collect()
    }
}

fn header_errors(sale_number: &str, customer_id: &str, branch_id: &str) -> Vec<FieldError> {
    let checks = [
        validate_sale_number(sale_number),
        validate_required("customer_id", customer_id),
        validate_required("branch_id", branch_id),
    ];
    checks
        .iter()
        .filter_map(|r| r.as_ref().err())
        .map(FieldError::from)
        .collect()
}

fn product_errors(
    index: usize,
    product_id: &str,
    quantity: i64,
    unit_price_cents: i64,
    errors: &mut Vec<FieldError>,
) {
    let checks = [
        validate_required("product_id", product_id),
        validate_quantity(quantity),
        validate_unit_price(Money::from_cents(unit_price_cents)),
    ];
    let before = errors.len();
    for err in checks.iter().filter_map(|r| r.as_ref().err()) {
        errors.push(FieldError::new(
            format!("products[{}].{}", index, err.field()),
            err.to_string(),
        ));
    }

    // Only meaningful once quantity and price are known to be positive
    if errors.len() == before {
        if let Err(err) = validate_line_amount(quantity, Money::from_cents(unit_price_cents)) {
            errors.push(FieldError::new(
                format!("products[{}].{}", index, err.field()),
                err.to_string(),
            ));
        }
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_errors(errors))
    }
}
