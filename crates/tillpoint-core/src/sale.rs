//! # Sales
//!
//! The immutable record a completed checkout leaves behind.
//!
//! ## Lifecycle
//! ```text
//! Cart::to_sale_lines() ─┐
//! PaymentPlan::breakdown() ─┼──► SaleDraft::new() ──► ledger commit ──► SaleRecord
//! reserved OrderNumber ──┘      (totals computed)     (one transaction)
//! ```
//!
//! Line items are value snapshots. Nothing here points back at the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order_number::OrderNumber;
use crate::types::{PaymentBreakdown, SaleStatus};
use crate::validation::{validate_business_id, validate_quantity, validate_user_id};

/// Order type written for counter sales.
pub const COUNTER_ORDER_TYPE: &str = "counter";

/// Origin written for sales rung up at a terminal.
pub const DESKTOP_ORIGIN: &str = "desktop";

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale (frozen at checkout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    /// 0-based order within the sale.
    pub position: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity
    pub line_total: Money,
    pub note: Option<String>,
}

// =============================================================================
// Sale Draft
// =============================================================================

/// A sale ready to commit: everything but the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub id: String,
    pub business_id: String,
    pub user_id: String,
    pub order_number: OrderNumber,
    pub lines: Vec<SaleLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    /// Legacy single-method column: first method's code.
    pub payment_method: String,
    pub payment_breakdown: PaymentBreakdown,
    pub status: SaleStatus,
    pub order_type: String,
    pub created_from: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleDraft {
    /// Builds a draft and computes its totals.
    ///
    /// ## Totals
    /// - `subtotal = Σ line_total`
    /// - `discount = 0`
    /// - `total = subtotal - discount`
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when there are no lines
    /// - [`CoreError::Validation`] for blank ids or non-positive quantities
    pub fn new(
        business_id: &str,
        user_id: &str,
        lines: Vec<SaleLine>,
        payment_breakdown: PaymentBreakdown,
        order_number: OrderNumber,
    ) -> CoreResult<Self> {
        validate_business_id(business_id)?;
        validate_user_id(user_id)?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        for line in &lines {
            validate_quantity(line.quantity)?;
        }

        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
        let discount = Money::zero();
        let total = subtotal - discount;

        Ok(SaleDraft {
            id: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            user_id: user_id.to_string(),
            order_number,
            lines,
            subtotal,
            discount,
            total,
            payment_method: payment_breakdown.primary_code().to_string(),
            payment_breakdown,
            status: SaleStatus::Completed,
            order_type: COUNTER_ORDER_TYPE.to_string(),
            created_from: DESKTOP_ORIGIN.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Same sale under an id issued by an earlier attempt.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A committed sale. Never mutated by the checkout pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub business_id: String,
    pub user_id: String,
    pub order_number: OrderNumber,
    pub lines: Vec<SaleLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: String,
    pub payment_breakdown: PaymentBreakdown,
    pub status: SaleStatus,
    pub order_type: String,
    pub created_from: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<SaleDraft> for SaleRecord {
    fn from(draft: SaleDraft) -> Self {
        SaleRecord {
            id: draft.id,
            business_id: draft.business_id,
            user_id: draft.user_id,
            order_number: draft.order_number,
            lines: draft.lines,
            subtotal: draft.subtotal,
            discount: draft.discount,
            total: draft.total,
            payment_method: draft.payment_method,
            payment_breakdown: draft.payment_breakdown,
            status: draft.status,
            order_type: draft.order_type,
            created_from: draft.created_from,
            created_at: draft.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::PaymentAllocation;

    fn line(position: i64, product_id: &str, unit_cents: i64, quantity: i64) -> SaleLine {
        SaleLine {
            position,
            product_id: product_id.to_string(),
            product_name: product_id.to_uppercase(),
            quantity,
            unit_price: Money::from_cents(unit_cents),
            line_total: Money::from_cents(unit_cents * quantity),
            note: None,
        }
    }

    fn split_breakdown() -> PaymentBreakdown {
        PaymentBreakdown {
            split: true,
            methods: vec![
                PaymentAllocation {
                    code: "card".to_string(),
                    amount: Money::from_cents(1500),
                },
                PaymentAllocation {
                    code: "cash".to_string(),
                    amount: Money::from_cents(1050),
                },
            ],
        }
    }

    #[test]
    fn test_draft_computes_totals() {
        let draft = SaleDraft::new(
            "biz-1",
            "user-1",
            vec![line(0, "burger", 1000, 2), line(1, "soda", 550, 1)],
            split_breakdown(),
            OrderNumber::format("A-", 42),
        )
        .unwrap();

        assert_eq!(draft.subtotal.cents(), 2550);
        assert!(draft.discount.is_zero());
        assert_eq!(draft.total.cents(), 2550);
        assert_eq!(draft.total_quantity(), 3);
        assert_eq!(draft.payment_method, "card");
        assert_eq!(draft.status, SaleStatus::Completed);
        assert_eq!(draft.order_type, "counter");
        assert_eq!(draft.created_from, "desktop");
    }

    #[test]
    fn test_draft_rejects_empty_lines() {
        let result = SaleDraft::new(
            "biz-1",
            "user-1",
            Vec::new(),
            split_breakdown(),
            OrderNumber::format("", 1),
        );
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_draft_rejects_blank_business() {
        let result = SaleDraft::new(
            "  ",
            "user-1",
            vec![line(0, "a", 100, 1)],
            split_breakdown(),
            OrderNumber::format("", 1),
        );
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_draft_rejects_zero_quantity() {
        let result = SaleDraft::new(
            "biz-1",
            "user-1",
            vec![line(0, "a", 100, 0)],
            split_breakdown(),
            OrderNumber::format("", 1),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_record_from_draft_keeps_everything() {
        let draft = SaleDraft::new(
            "biz-1",
            "user-1",
            vec![line(0, "a", 100, 1)],
            PaymentBreakdown::single("cash", Money::from_cents(100)),
            OrderNumber::format("", 7),
        )
        .unwrap();
        let record = SaleRecord::from(draft.clone());

        assert_eq!(record.id, draft.id);
        assert_eq!(record.order_number.as_str(), "000007");
        assert_eq!(record.total, draft.total);
        assert_eq!(record.lines, draft.lines);
    }
}
