//! # Checkout Errors
//!
//! Every way `CheckoutPipeline::checkout` can fail before a sale exists.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Error Classes                            │
//! │                                                                         │
//! │  Validation       local       empty cart, underpaid plan    no effects  │
//! │  UnknownProduct   local       catalog has no such product   no effects  │
//! │  SequenceMissing  fatal       business has no order counter             │
//! │  Numbering        retryable   reservation failed            cart kept   │
//! │  Persistence      retryable   sale write rolled back        cart kept   │
//! │  Timeout          retryable   a pre-commit step ran late    cart kept   │
//! │  Lookup           retryable   catalog/directory unreachable             │
//! │                                                                         │
//! │  Settlement trouble is not here: the sale exists by then, so it is      │
//! │  reported on the receipt as InventoryStatus::Pending.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::services::LedgerError;
use tillpoint_core::{CoreError, ValidationError};

/// Shown verbatim to the operator when the business has no order counter.
pub const SEQUENCE_MISSING_MESSAGE: &str =
    "No order sequence is configured for this business. Contact the administrator.";

/// Pipeline step, for timeouts and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Lookup,
    Numbering,
    Persistence,
    Settlement,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStep::Lookup => write!(f, "lookup"),
            CheckoutStep::Numbering => write!(f, "numbering"),
            CheckoutStep::Persistence => write!(f, "persistence"),
            CheckoutStep::Settlement => write!(f, "settlement"),
        }
    }
}

/// Checkout failure. The cart is untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Empty cart or a payment plan that does not cover the total.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Product not found: {product_id}")]
    UnknownProduct { product_id: String },

    #[error("{}", SEQUENCE_MISSING_MESSAGE)]
    SequenceMissing { business_id: String },

    #[error("Could not reserve an order number: {0}")]
    Numbering(#[source] LedgerError),

    #[error("Could not save the sale: {0}")]
    Persistence(#[source] LedgerError),

    #[error("Could not load checkout data: {0}")]
    Lookup(#[source] LedgerError),

    #[error("The {step} step timed out after {} ms", .after.as_millis())]
    Timeout { step: CheckoutStep, after: Duration },
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Validation(CoreError::Validation(err))
    }
}

impl CheckoutError {
    /// Whether the operator can simply press "complete" again.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Numbering(err)
            | CheckoutError::Persistence(err)
            | CheckoutError::Lookup(err) => err.is_retryable(),
            CheckoutError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Wraps a reservation failure, singling out the missing counter.
    pub(crate) fn from_numbering(err: LedgerError) -> Self {
        match err {
            LedgerError::SequenceMissing { business_id } => {
                CheckoutError::SequenceMissing { business_id }
            }
            other => CheckoutError::Numbering(other),
        }
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_db::DbError;

    #[test]
    fn test_sequence_missing_message_is_verbatim() {
        let err = CheckoutError::from_numbering(LedgerError::SequenceMissing {
            business_id: "biz-1".to_string(),
        });
        assert_eq!(err.to_string(), SEQUENCE_MISSING_MESSAGE);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_numbering_failure_is_retryable() {
        let err = CheckoutError::from_numbering(LedgerError::Unavailable("offline".into()));
        assert!(matches!(err, CheckoutError::Numbering(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rejected_commit_is_not_retryable() {
        let rejected = DbError::from_sqlite_message("CHECK constraint failed: quantity > 0");
        assert!(!CheckoutError::Persistence(LedgerError::Database(rejected)).is_retryable());

        let locked = DbError::from_sqlite_message("database is locked");
        assert!(CheckoutError::Persistence(LedgerError::Database(locked)).is_retryable());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = CheckoutError::from(ValidationError::MethodNotSelected);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Validation error: Select a payment method");
    }

    #[test]
    fn test_timeout_message() {
        let err = CheckoutError::Timeout {
            step: CheckoutStep::Persistence,
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "The persistence step timed out after 1500 ms");
    }
}
