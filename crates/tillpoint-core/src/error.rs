//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillpoint-core errors (this file)                                      │
//! │  ├── CoreError        - Cart and sale-draft failures                    │
//! │  └── ValidationError  - Input and payment plan failures                 │
//! │                                                                         │
//! │  tillpoint-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  tillpoint-checkout errors                                              │
//! │  ├── LedgerError      - Store failures behind the service traits        │
//! │  └── CheckoutError    - What the pipeline reports                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → CheckoutOutcome    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (line id, slot, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart operation referenced a line that is not in the cart.
    ///
    /// ## When This Occurs
    /// - The line was removed (quantity set to 0) in another step
    /// - The cart was cleared after a completed sale
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Checkout was requested on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// The payment plan reports every reason it cannot complete through here.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., whitespace in an order prefix).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The business has no active payment methods.
    #[error("No active payment methods are configured")]
    NoPaymentMethods,

    /// A code that is not in the business's method catalog.
    #[error("Unknown payment method: {code}")]
    UnknownPaymentMethod { code: String },

    /// Single mode without a selected method.
    #[error("Select a payment method")]
    MethodNotSelected,

    /// A split slot without a method.
    #[error("Split payment #{} has no method", .slot + 1)]
    SlotMethodMissing { slot: usize },

    /// A split slot whose amount is zero or negative.
    #[error("Split payment #{} must have an amount greater than zero", .slot + 1)]
    SlotAmountNotPositive { slot: usize },

    /// The entered amount does not cover the total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total $25.50, split: cash $10.00 + card $10.00
    ///      │
    ///      ▼
    /// Underpayment { entered: $20.00, total: $25.50 }
    ///      │
    ///      ▼
    /// UI keeps "Complete sale" disabled
    /// ```
    #[error("Entered {entered} does not cover total {total}")]
    Underpayment { entered: Money, total: Money },
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
    fn test_error_messages() {
        let err = CoreError::LineNotFound("line-1".to_string());
        assert_eq!(err.to_string(), "Cart line not found: line-1");
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "business_id".to_string(),
        };
        assert_eq!(err.to_string(), "business_id is required");

        let err = ValidationError::Underpayment {
            entered: Money::from_cents(2000),
            total: Money::from_cents(2550),
        };
        assert_eq!(err.to_string(), "Entered $20.00 does not cover total $25.50");
    }

    #[test]
    fn test_slot_messages_are_one_based() {
        let err = ValidationError::SlotMethodMissing { slot: 0 };
        assert_eq!(err.to_string(), "Split payment #1 has no method");

        let err = ValidationError::SlotAmountNotPositive { slot: 1 };
        assert_eq!(
            err.to_string(),
            "Split payment #2 must have an amount greater than zero"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::MethodNotSelected.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
