//! # Validation Module
//!
//! Input validation utilities for the checkout pipeline.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Tender screen                                                 │
//! │  ├── sanitize_amount_input() on every keystroke                         │
//! │  └── PaymentPlan::assess() re-run after every edit                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain (THIS MODULE)                                          │
//! │  └── ids, quantities, prefixes, slot counts                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (quantity > 0), CHECK (current_stock >= 0)                   │
//! │  ├── UNIQUE (business_id, order_number)                                 │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::validation::{validate_quantity, validate_split_slots};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_split_slots(1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fewest slots a split payment can have.
pub const MIN_SPLIT_SLOTS: usize = 2;

/// Most slots the tender screen will lay out.
pub const MAX_SPLIT_SLOTS: usize = 8;

/// Longest accepted order number prefix.
pub const MAX_ORDER_PREFIX_LEN: usize = 10;

/// Most units a single cart line can hold.
pub const MAX_LINE_QUANTITY: i64 = 99_999;

// =============================================================================
// Identifier Validators
// =============================================================================

fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a tenant id. Must not be blank.
pub fn validate_business_id(business_id: &str) -> ValidationResult<()> {
    validate_required("business_id", business_id)
}

/// Validates the operator id recorded on a sale. Must not be blank.
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    validate_required("user_id", user_id)
}

/// Validates an order number prefix.
///
/// ## Rules
/// - May be empty
/// - At most 10 characters
/// - No whitespace
///
/// ## Example
/// ```rust
/// use tillpoint_core::validation::validate_order_prefix;
///
/// assert!(validate_order_prefix("").is_ok());
/// assert!(validate_order_prefix("A-").is_ok());
/// assert!(validate_order_prefix("A B").is_err());
/// ```
pub fn validate_order_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.chars().count() > MAX_ORDER_PREFIX_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "prefix".to_string(),
            reason: format!("must be at most {} characters", MAX_ORDER_PREFIX_LEN),
        });
    }

    if prefix.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "prefix".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - At most [`MAX_LINE_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale draft                                                             │
/// │                                                                         │
/// │  cart.to_sale_lines()                                                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(line.quantity) ← THIS FUNCTION                       │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"                │
/// │       ├── qty > MAX_LINE_QUANTITY? → Error: out of range                │
/// │       │                                                                 │
/// │       └── OK → totals computed                                          │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a split slot count.
///
/// ## Rules
/// - Between [`MIN_SPLIT_SLOTS`] and [`MAX_SPLIT_SLOTS`]
pub fn validate_split_slots(slots: usize) -> ValidationResult<()> {
    if !(MIN_SPLIT_SLOTS..=MAX_SPLIT_SLOTS).contains(&slots) {
        return Err(ValidationError::OutOfRange {
            field: "split_slots".to_string(),
            min: MIN_SPLIT_SLOTS as i64,
            max: MAX_SPLIT_SLOTS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ids() {
        assert!(validate_business_id("biz-1").is_ok());
        assert!(validate_business_id("").is_err());
        assert!(validate_business_id("   ").is_err());
        assert!(validate_user_id("cashier").is_ok());
        assert!(validate_user_id("").is_err());
    }

    #[test]
    fn test_validate_order_prefix() {
        assert!(validate_order_prefix("").is_ok());
        assert!(validate_order_prefix("A-").is_ok());
        assert!(validate_order_prefix("CAJA1-").is_ok());

        assert!(validate_order_prefix("A B").is_err());
        assert!(validate_order_prefix(&"P".repeat(11)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
        assert!(validate_quantity(i64::MAX).is_err());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert!(validate_price(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_split_slots() {
        assert!(validate_split_slots(2).is_ok());
        assert!(validate_split_slots(8).is_ok());

        assert!(validate_split_slots(0).is_err());
        assert!(validate_split_slots(1).is_err());
        assert!(validate_split_slots(9).is_err());
    }
}
