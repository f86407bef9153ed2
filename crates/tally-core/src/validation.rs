//! # Validation Module
//!
//! Field-level checks shared by the aggregate factories and the HTTP
//! request validators.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Request DTO (tally-api)                                       │
//! │  └── Runs every check, collects all failures into one 400 response      │
//! │                                                                         │
//! │  Layer 2: Domain factories (this crate)                                 │
//! │  └── Same checks, first failure returned as CoreError::InvalidArgument  │
//! │                                                                         │
//! │  Layer 3: Database constraints                                          │
//! │  └── CHECK (quantity > 0), CHECK (unit_price_cents > 0)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation functions.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A sale number must contain something other than whitespace.
///
/// ```rust
/// use tally_core::validation::validate_sale_number;
///
/// assert!(validate_sale_number("S-1001").is_ok());
/// assert!(validate_sale_number("   ").is_err());
/// ```
pub fn validate_sale_number(sale_number: &str) -> ValidationResult<()> {
    validate_required("sale_number", sale_number)
}

/// Generic non-blank check used for opaque identifiers.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Quantities must be strictly positive. The upper bound is a discount rule,
/// not an input rule, so it is not checked here.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Unit prices must be strictly positive.
pub fn validate_unit_price(unit_price: Money) -> ValidationResult<()> {
    if !unit_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }
    Ok(())
}

/// `quantity × unit_price` must fit in cents. Call after the positivity
/// checks.
pub fn validate_line_amount(quantity: i64, unit_price: Money) -> ValidationResult<()> {
    if unit_price.checked_multiply_quantity(quantity).is_none() {
        return Err(ValidationError::OutOfRange {
            field: "line_total".to_string(),
        });
    }
    Ok(())
}

/// Validates a UUID string. Used when a client supplies a line item id.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_number() {
        assert!(validate_sale_number("S-1").is_ok());
        assert!(matches!(
            validate_sale_number(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_sale_number(" \t ").is_err());
    }

    #[test]
    fn test_required_reports_field_name() {
        let err = validate_required("branch_id", "").unwrap_err();
        assert_eq!(err.field(), "branch_id");
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(21).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_unit_price() {
        assert!(validate_unit_price(Money::from_cents(1)).is_ok());
        assert!(validate_unit_price(Money::zero()).is_err());
        assert!(validate_unit_price(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_line_amount() {
        assert!(validate_line_amount(20, Money::from_cents(1_000_000)).is_ok());
        assert!(validate_line_amount(1, Money::from_cents(i64::MAX)).is_ok());

        let err = validate_line_amount(20, Money::from_cents(500_000_000_000_000_000)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(err.field(), "line_total");
    }

    #[test]
    fn test_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(matches!(
            validate_uuid("id", "not-a-uuid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
