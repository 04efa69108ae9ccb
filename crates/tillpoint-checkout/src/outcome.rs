//! # Checkout Outcome
//!
//! What the operator sees after pressing "complete".
//!
//! ## Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Result<CheckoutReceipt, CheckoutError>                                 │
//! │       │                                                                 │
//! │       ├── Err(e) ───────────────► SaleFailed { code, message,           │
//! │       │                                        cart_intact: true }      │
//! │       │                                                                 │
//! │       └── Ok(receipt)                                                   │
//! │             ├── Settled ────────► SaleSucceeded { inventory_warning:    │
//! │             │                                     None }                │
//! │             └── Pending ────────► SaleSucceeded { inventory_warning:    │
//! │                                                   Some("...") }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! { "outcome": "sale_failed", "code": "PERSISTENCE_FAILED",
//!   "message": "Could not save the sale. The cart was kept, try again.",
//!   "cartIntact": true }
//! ```

use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

use crate::error::{CheckoutError, CheckoutResult, SEQUENCE_MISSING_MESSAGE};
use tillpoint_core::{CoreError, Money, SaleRecord, StockLevel, StockUpdate};

const CART_KEPT: &str = "The cart was kept, try again.";

// =============================================================================
// Inventory
// =============================================================================

/// A stock decrement that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingStock {
    pub product_id: String,
    pub quantity: i64,
    /// Last failure, for the reconciliation screen.
    pub reason: String,
}

impl PendingStock {
    pub fn to_update(&self) -> StockUpdate {
        StockUpdate {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
        }
    }
}

/// How inventory settlement ended for a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InventoryStatus {
    /// Every line was decremented.
    Settled { levels: Vec<StockLevel> },
    /// Some lines still need a decrement.
    Pending {
        levels: Vec<StockLevel>,
        pending: Vec<PendingStock>,
    },
}

impl InventoryStatus {
    /// Stock after the decrements that went through.
    pub fn levels(&self) -> &[StockLevel] {
        match self {
            InventoryStatus::Settled { levels } | InventoryStatus::Pending { levels, .. } => levels,
        }
    }

    pub fn pending(&self) -> &[PendingStock] {
        match self {
            InventoryStatus::Settled { .. } => &[],
            InventoryStatus::Pending { pending, .. } => pending,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, InventoryStatus::Settled { .. })
    }

    /// Products that crossed into the low-stock band.
    pub fn low_stock(&self) -> Vec<&StockLevel> {
        self.levels().iter().filter(|l| l.is_low()).collect()
    }

    pub fn out_of_stock(&self) -> Vec<&StockLevel> {
        self.levels().iter().filter(|l| l.is_out()).collect()
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A completed sale and what happened to inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub sale: SaleRecord,
    /// Cash to hand back. Zero for electronic and split payments.
    pub change: Money,
    pub inventory: InventoryStatus,
}

impl CheckoutReceipt {
    /// Operator-facing note when stock was not fully updated.
    pub fn inventory_warning(&self) -> Option<String> {
        match self.inventory.pending().len() {
            0 => None,
            n => Some(format!(
                "Sale {} recorded, but stock was not updated for {} product(s). Inventory needs reconciliation.",
                self.sale.order_number, n
            )),
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Machine-readable failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Empty cart or an invalid payment plan
    ValidationError,

    /// Product lookup found nothing
    ProductNotFound,

    /// No order counter for the business (configuration)
    SequenceMissing,

    /// Order number reservation failed
    NumberingFailed,

    /// Sale write failed and was rolled back
    PersistenceFailed,

    /// Catalog or payment method directory unreachable
    LookupFailed,

    /// A step before the sale commit ran out of time
    Timeout,
}

/// The two shapes a checkout can end in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    #[serde(rename_all = "camelCase")]
    SaleFailed {
        code: ErrorCode,
        message: String,
        /// Always true: a failed checkout never touches the cart.
        cart_intact: bool,
    },
    #[serde(rename_all = "camelCase")]
    SaleSucceeded {
        receipt: CheckoutReceipt,
        inventory_warning: Option<String>,
    },
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::SaleSucceeded { .. })
    }

    fn failed(code: ErrorCode, message: impl Into<String>) -> Self {
        CheckoutOutcome::SaleFailed {
            code,
            message: message.into(),
            cart_intact: true,
        }
    }
}

impl From<CheckoutError> for CheckoutOutcome {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(CoreError::Validation(e)) => {
                CheckoutOutcome::failed(ErrorCode::ValidationError, e.to_string())
            }
            CheckoutError::Validation(e) => {
                CheckoutOutcome::failed(ErrorCode::ValidationError, e.to_string())
            }
            CheckoutError::UnknownProduct { product_id } => CheckoutOutcome::failed(
                ErrorCode::ProductNotFound,
                format!("Product not found: {}", product_id),
            ),
            CheckoutError::SequenceMissing { business_id } => {
                error!(business_id = %business_id, "Checkout blocked: no order sequence");
                CheckoutOutcome::failed(ErrorCode::SequenceMissing, SEQUENCE_MISSING_MESSAGE)
            }
            CheckoutError::Numbering(e) => {
                warn!(error = %e, "Order number reservation failed");
                CheckoutOutcome::failed(
                    ErrorCode::NumberingFailed,
                    format!("Could not get an order number. {}", CART_KEPT),
                )
            }
            CheckoutError::Persistence(e) => {
                error!(error = %e, "Sale commit failed");
                CheckoutOutcome::failed(
                    ErrorCode::PersistenceFailed,
                    format!("Could not save the sale. {}", CART_KEPT),
                )
            }
            CheckoutError::Lookup(e) => {
                warn!(error = %e, "Checkout lookup failed");
                CheckoutOutcome::failed(
                    ErrorCode::LookupFailed,
                    format!("Could not load checkout data. {}", CART_KEPT),
                )
            }
            CheckoutError::Timeout { step, after } => {
                warn!(%step, after_ms = after.as_millis() as u64, "Checkout step timed out");
                CheckoutOutcome::failed(
                    ErrorCode::Timeout,
                    format!("The {} step took too long. {}", step, CART_KEPT),
                )
            }
        }
    }
}

impl From<CheckoutReceipt> for CheckoutOutcome {
    fn from(receipt: CheckoutReceipt) -> Self {
        let inventory_warning = receipt.inventory_warning();
        CheckoutOutcome::SaleSucceeded {
            receipt,
            inventory_warning,
        }
    }
}

impl From<CheckoutResult<CheckoutReceipt>> for CheckoutOutcome {
    fn from(result: CheckoutResult<CheckoutReceipt>) -> Self {
        match result {
            Ok(receipt) => receipt.into(),
            Err(err) => err.into(),
        }
    }
}
