//! # Error Types
//!
//! Domain error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError         - What a domain operation can fail with          │
//! │  ├── ValidationError   - A single malformed input                       │
//! │  └── SaleStateError    - A lifecycle precondition that did not hold     │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError           - Storage failures, NotFound, ConcurrencyConflict│
//! │                                                                         │
//! │  tally-api errors                                                      │
//! │  └── ApiError          - What HTTP clients see                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴──► ApiError → JSON response       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::discount::DiscountFailure;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the sale aggregate and its collaborators.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input to a factory or mutator.
    ///
    /// ## When This Occurs
    /// - Blank sale number or product id
    /// - Zero or negative quantity or unit price
    /// - Creating a sale without any line items
    /// - A line or sale amount that does not fit in `Money`
    /// - The same line item id listed twice in one update
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// A lifecycle precondition was not met. Only the first failing check is
    /// reported.
    #[error("{0}")]
    InvalidState(SaleStateError),

    /// One or more line items broke a business rule. Every offending item is
    /// listed; none of them stops the others from being evaluated.
    #[error("{} business rule violation(s): {}", .0.len(), summarize(.0))]
    RuleViolations(Vec<DiscountFailure>),
}

fn summarize(failures: &[DiscountFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Sale State Error
// =============================================================================

/// Lifecycle preconditions checked by `Sale::complete_checkout`, in the
/// order they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SaleStateError {
    #[error("The sale must contain at least one item to be finalized.")]
    NoItems,

    #[error("The total amount of the sale must be greater than zero.")]
    NonPositiveTotal,

    #[error("Cannot finalize a cancelled sale.")]
    Cancelled,

    #[error("The sale has already been checked out.")]
    AlreadyCheckedOut,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is present but unusable (e.g. not a UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Amount too large to represent in cents.
    #[error("{field} is too large")]
    OutOfRange { field: String },

    /// A key that must be unique within a request appears again.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::OutOfRange { field }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sale_number".to_string(),
        };
        assert_eq!(err.to_string(), "sale_number is required");
        assert_eq!(err.field(), "sale_number");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::Duplicate {
            field: "id".to_string(),
            value: "item-1".to_string(),
        };
        assert_eq!(err.to_string(), "id 'item-1' appears more than once");
        assert_eq!(err.field(), "id");
    }

    #[test]
    fn test_state_error_messages() {
        let err = CoreError::InvalidState(SaleStateError::Cancelled);
        assert_eq!(err.to_string(), "Cannot finalize a cancelled sale.");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "product_id".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_rule_violations_message_lists_every_item() {
        let err = CoreError::RuleViolations(vec![
            DiscountFailure::new("item-a", 21),
            DiscountFailure::new("item-b", 40),
        ]);
        let message = err.to_string();
        assert!(message.starts_with("2 business rule violation(s)"));
        assert!(message.contains("item-a"));
        assert!(message.contains("item-b"));
    }
}
