//! # Payment Plan
//!
//! Decides whether the operator's payment entries cover the cart total.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PaymentPlan                                      │
//! │                                                                         │
//! │   ┌──────────────┐   set_split(true)    ┌──────────────────────────┐   │
//! │   │   Single     │ ───────────────────► │   Split (N ≥ 2 slots)    │   │
//! │   │              │ ◄─────────────────── │                          │   │
//! │   │  method      │   set_split(false)   │  slot[i].method          │   │
//! │   │  received    │                      │  slot[i].amount          │   │
//! │   └──────────────┘                      └──────────────────────────┘   │
//! │                                                                         │
//! │   Single valid:  known method AND (electronic OR received ≥ total)      │
//! │   Split valid:   every slot has a known method and amount > 0           │
//! │                  AND Σ amounts ≥ total                                  │
//! │                                                                         │
//! │   can_complete() re-derives this from the inputs on every call.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amount inputs are kept as the sanitized text the operator sees and parsed
//! with [`Money::parse_amount`] whenever they are read. Nothing here panics
//! on operator input.
//!
//! ## Example
//! ```rust
//! use tillpoint_core::money::Money;
//! use tillpoint_core::payment::{MethodCatalog, PaymentPlan};
//! use tillpoint_core::types::{MethodIcon, PaymentMethod, TenderKind};
//!
//! let cash = PaymentMethod {
//!     id: "pm-1".into(),
//!     business_id: "biz-1".into(),
//!     code: "cash".into(),
//!     name: "Cash".into(),
//!     icon: MethodIcon::MoneyBill,
//!     color: "#16a34a".into(),
//!     tender: TenderKind::Cash,
//!     is_active: true,
//!     display_order: 0,
//! };
//! let catalog = MethodCatalog::new(vec![cash]);
//!
//! let mut plan = PaymentPlan::new(Money::from_cents(2550), &catalog, 2);
//! plan.set_amount_received("30");
//! assert!(plan.can_complete());
//! assert_eq!(plan.change().cents(), 450);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{sanitize_amount_input, Money};
use crate::types::{PaymentAllocation, PaymentBreakdown, PaymentMethod};
use crate::validation::{ValidationResult, MIN_SPLIT_SLOTS};

// =============================================================================
// Method Catalog
// =============================================================================

/// Lookup table of the methods an operator may pick.
///
/// Built from directory entries: inactive ones are dropped and the rest are
/// ordered by `display_order` (ties keep directory order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodCatalog {
    methods: Vec<PaymentMethod>,
}

impl MethodCatalog {
    pub fn new(methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        let mut methods: Vec<PaymentMethod> =
            methods.into_iter().filter(|m| m.is_active).collect();
        methods.sort_by_key(|m| m.display_order);
        MethodCatalog { methods }
    }

    /// Methods in display order.
    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    pub fn get(&self, code: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn first(&self) -> Option<&PaymentMethod> {
        self.methods.first()
    }

    /// The `index`-th method, or the first one past the end.
    pub fn nth_or_first(&self, index: usize) -> Option<&PaymentMethod> {
        self.methods.get(index).or_else(|| self.first())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

// =============================================================================
// Plan State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    Single,
    Split,
}

/// One method/amount row of a split payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitSlot {
    pub method_code: Option<String>,
    /// Sanitized text as shown in the input.
    pub amount_input: String,
}

impl SplitSlot {
    pub fn amount(&self) -> Money {
        Money::parse_amount(&self.amount_input)
    }
}

/// Snapshot for the tender screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlanSummary {
    pub mode: PlanMode,
    pub total: Money,
    pub change: Money,
    pub split_total_entered: Money,
    pub can_complete: bool,
    /// Why the sale cannot complete yet.
    pub blocked_reason: Option<String>,
}

/// The operator's in-progress payment entries for one checkout.
#[derive(Debug, Clone)]
pub struct PaymentPlan {
    total: Money,
    catalog: MethodCatalog,
    mode: PlanMode,
    selected_code: Option<String>,
    received_input: String,
    slots: Vec<SplitSlot>,
}

impl PaymentPlan {
    /// Creates a plan in single mode.
    ///
    /// ## Defaults
    /// - Single mode selects the first method
    /// - Slot `i` selects the `i`-th method, or the first
    /// - `split_slots` below 2 is raised to 2
    pub fn new(total: Money, catalog: &MethodCatalog, split_slots: usize) -> Self {
        let slot_count = split_slots.max(MIN_SPLIT_SLOTS);
        let slots = (0..slot_count)
            .map(|i| SplitSlot {
                method_code: catalog.nth_or_first(i).map(|m| m.code.clone()),
                amount_input: String::new(),
            })
            .collect();

        PaymentPlan {
            total,
            catalog: catalog.clone(),
            mode: PlanMode::Single,
            selected_code: catalog.first().map(|m| m.code.clone()),
            received_input: String::new(),
            slots,
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    pub fn set_split(&mut self, split: bool) {
        self.mode = if split { PlanMode::Split } else { PlanMode::Single };
    }

    /// Selects the single-mode method. Unknown codes are reported by
    /// [`PaymentPlan::assess`].
    pub fn select_method(&mut self, code: &str) {
        self.selected_code = Some(code.to_string());
    }

    /// Stores the received amount after sanitizing it. Returns what was kept.
    pub fn set_amount_received(&mut self, raw: &str) -> &str {
        self.received_input = sanitize_amount_input(raw);
        &self.received_input
    }

    /// Sets the received amount to exactly the total.
    pub fn fill_total(&mut self) {
        self.received_input = self.total.to_decimal_string();
    }

    pub fn set_slot_method(&mut self, slot: usize, code: &str) -> ValidationResult<()> {
        self.slot_mut(slot)?.method_code = Some(code.to_string());
        Ok(())
    }

    /// Stores a slot amount after sanitizing it. Returns what was kept.
    pub fn set_slot_amount(&mut self, slot: usize, raw: &str) -> ValidationResult<&str> {
        let slot = self.slot_mut(slot)?;
        slot.amount_input = sanitize_amount_input(raw);
        Ok(&slot.amount_input)
    }

    /// Replaces the total, e.g. after the cart changed behind the screen.
    pub fn set_total(&mut self, total: Money) {
        self.total = total;
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    pub fn is_split(&self) -> bool {
        self.mode == PlanMode::Split
    }

    pub fn catalog(&self) -> &MethodCatalog {
        &self.catalog
    }

    pub fn slots(&self) -> &[SplitSlot] {
        &self.slots
    }

    pub fn received_input(&self) -> &str {
        &self.received_input
    }

    pub fn amount_received(&self) -> Money {
        Money::parse_amount(&self.received_input)
    }

    /// The single-mode method, if its code is in the catalog.
    pub fn selected_method(&self) -> Option<&PaymentMethod> {
        self.selected_code
            .as_deref()
            .and_then(|code| self.catalog.get(code))
    }

    /// Change to hand back.
    ///
    /// Only a cash method in single mode gives change:
    /// `max(0, received - total)`. Everything else is zero.
    pub fn change(&self) -> Money {
        match (self.mode, self.selected_method()) {
            (PlanMode::Single, Some(method)) if method.tender.gives_change() => {
                self.amount_received().saturating_sub_to_zero(self.total)
            }
            _ => Money::zero(),
        }
    }

    /// Σ slot amounts as currently entered.
    pub fn split_total_entered(&self) -> Money {
        self.slots.iter().map(SplitSlot::amount).sum()
    }

    /// Whether the sale may be submitted with the current entries.
    pub fn can_complete(&self) -> bool {
        self.assess().is_ok()
    }

    /// Checks the current entries. `Err` names the first blocking problem.
    pub fn assess(&self) -> ValidationResult<()> {
        if self.catalog.is_empty() {
            return Err(ValidationError::NoPaymentMethods);
        }

        match self.mode {
            PlanMode::Single => self.assess_single(),
            PlanMode::Split => self.assess_split(),
        }
    }

    fn assess_single(&self) -> ValidationResult<()> {
        let code = self
            .selected_code
            .as_deref()
            .ok_or(ValidationError::MethodNotSelected)?;
        let method = self.known_method(code)?;

        if method.tender.gives_change() {
            let received = self.amount_received();
            if received < self.total {
                return Err(ValidationError::Underpayment {
                    entered: received,
                    total: self.total,
                });
            }
        }

        Ok(())
    }

    fn assess_split(&self) -> ValidationResult<()> {
        for (index, slot) in self.slots.iter().enumerate() {
            let code = slot
                .method_code
                .as_deref()
                .ok_or(ValidationError::SlotMethodMissing { slot: index })?;
            self.known_method(code)?;

            if !slot.amount().is_positive() {
                return Err(ValidationError::SlotAmountNotPositive { slot: index });
            }
        }

        let entered = self.split_total_entered();
        if entered < self.total {
            return Err(ValidationError::Underpayment {
                entered,
                total: self.total,
            });
        }

        Ok(())
    }

    /// The breakdown to record on the sale.
    ///
    /// - Single: one method carrying exactly the total
    /// - Split: every slot with its entered (unclamped) amount
    pub fn breakdown(&self) -> ValidationResult<PaymentBreakdown> {
        self.assess()?;

        match self.mode {
            PlanMode::Single => {
                let code = self
                    .selected_code
                    .clone()
                    .ok_or(ValidationError::MethodNotSelected)?;
                Ok(PaymentBreakdown::single(code, self.total))
            }
            PlanMode::Split => {
                let methods = self
                    .slots
                    .iter()
                    .filter_map(|slot| {
                        slot.method_code.as_ref().map(|code| PaymentAllocation {
                            code: code.clone(),
                            amount: slot.amount(),
                        })
                    })
                    .collect();
                Ok(PaymentBreakdown {
                    split: true,
                    methods,
                })
            }
        }
    }

    pub fn summary(&self) -> PlanSummary {
        let assessment = self.assess();
        PlanSummary {
            mode: self.mode,
            total: self.total,
            change: self.change(),
            split_total_entered: self.split_total_entered(),
            can_complete: assessment.is_ok(),
            blocked_reason: assessment.err().map(|e| e.to_string()),
        }
    }

    fn known_method(&self, code: &str) -> ValidationResult<&PaymentMethod> {
        self.catalog
            .get(code)
            .ok_or_else(|| ValidationError::UnknownPaymentMethod {
                code: code.to_string(),
            })
    }

    fn slot_mut(&mut self, slot: usize) -> ValidationResult<&mut SplitSlot> {
        let max = self.slots.len() as i64 - 1;
        self.slots
            .get_mut(slot)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "slot".to_string(),
                min: 0,
                max,
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MethodIcon, TenderKind};

    fn method(code: &str, tender: TenderKind, display_order: i64, is_active: bool) -> PaymentMethod {
        PaymentMethod {
            id: format!("pm-{}", code),
            business_id: "biz-1".to_string(),
            code: code.to_string(),
            name: code.to_uppercase(),
            icon: MethodIcon::DollarSign,
            color: "#000000".to_string(),
            tender,
            is_active,
            display_order,
        }
    }

    fn catalog() -> MethodCatalog {
        MethodCatalog::new(vec![
            method("card", TenderKind::Electronic, 1, true),
            method("cash", TenderKind::Cash, 0, true),
            method("cheque", TenderKind::Electronic, 2, false),
        ])
    }

    fn scenario_plan() -> PaymentPlan {
        PaymentPlan::new(Money::from_cents(2550), &catalog(), 2)
    }

    #[test]
    fn test_catalog_filters_and_orders() {
        let catalog = catalog();
        let codes: Vec<&str> = catalog.methods().iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["cash", "card"]);
        assert!(!catalog.contains("cheque"));
        assert_eq!(catalog.nth_or_first(5).map(|m| m.code.as_str()), Some("cash"));
    }

    #[test]
    fn test_defaults() {
        let plan = scenario_plan();
        assert_eq!(plan.mode(), PlanMode::Single);
        assert_eq!(plan.selected_method().map(|m| m.code.as_str()), Some("cash"));
        assert_eq!(plan.slots()[0].method_code.as_deref(), Some("cash"));
        assert_eq!(plan.slots()[1].method_code.as_deref(), Some("card"));
    }

    #[test]
    fn test_slot_count_is_at_least_two() {
        let plan = PaymentPlan::new(Money::from_cents(100), &catalog(), 0);
        assert_eq!(plan.slots().len(), 2);

        let plan = PaymentPlan::new(Money::from_cents(100), &catalog(), 3);
        assert_eq!(plan.slots().len(), 3);
        assert_eq!(plan.slots()[2].method_code.as_deref(), Some("cash"));
    }

    #[test]
    fn test_cash_single_scenario() {
        let mut plan = scenario_plan();
        plan.select_method("cash");
        plan.set_amount_received("30.00");

        assert!(plan.can_complete());
        assert_eq!(plan.change().cents(), 450);

        let breakdown = plan.breakdown().unwrap();
        assert!(!breakdown.split);
        assert_eq!(breakdown.methods.len(), 1);
        assert_eq!(breakdown.methods[0].code, "cash");
        assert_eq!(breakdown.methods[0].amount.cents(), 2550);
    }

    #[test]
    fn test_cash_underpayment_blocks() {
        let mut plan = scenario_plan();
        plan.set_amount_received("20");

        assert!(!plan.can_complete());
        assert!(plan.change().is_zero());
        assert!(matches!(
            plan.assess(),
            Err(ValidationError::Underpayment { .. })
        ));
        assert!(plan.breakdown().is_err());
    }

    #[test]
    fn test_electronic_single_needs_no_amount() {
        let mut plan = scenario_plan();
        plan.select_method("card");

        assert!(plan.can_complete());
        assert!(plan.change().is_zero());
        assert_eq!(plan.breakdown().unwrap().methods[0].amount.cents(), 2550);
    }

    #[test]
    fn test_fill_total() {
        let mut plan = scenario_plan();
        plan.fill_total();

        assert_eq!(plan.received_input(), "25.50");
        assert!(plan.can_complete());
        assert!(plan.change().is_zero());
    }

    #[test]
    fn test_unknown_method_blocks() {
        let mut plan = scenario_plan();
        plan.select_method("cheque");
        plan.fill_total();

        assert!(matches!(
            plan.assess(),
            Err(ValidationError::UnknownPaymentMethod { .. })
        ));
    }

    #[test]
    fn test_no_methods_blocks() {
        let mut plan = PaymentPlan::new(Money::from_cents(100), &MethodCatalog::default(), 2);
        plan.set_amount_received("100");

        assert!(matches!(plan.assess(), Err(ValidationError::NoPaymentMethods)));
        assert!(plan.selected_method().is_none());
    }

    #[test]
    fn test_split_scenario_valid() {
        let mut plan = scenario_plan();
        plan.set_split(true);
        plan.set_slot_method(0, "cash").unwrap();
        plan.set_slot_amount(0, "15.00").unwrap();
        plan.set_slot_method(1, "card").unwrap();
        plan.set_slot_amount(1, "10.50").unwrap();

        assert_eq!(plan.split_total_entered().cents(), 2550);
        assert!(plan.can_complete());

        let breakdown = plan.breakdown().unwrap();
        assert!(breakdown.split);
        assert_eq!(breakdown.total_entered().cents(), 2550);
        assert!(breakdown.methods.iter().all(|m| m.amount.is_positive()));
    }

    #[test]
    fn test_split_scenario_short() {
        let mut plan = scenario_plan();
        plan.set_split(true);
        plan.set_slot_amount(0, "10.00").unwrap();
        plan.set_slot_amount(1, "10.00").unwrap();

        assert_eq!(plan.split_total_entered().cents(), 2000);
        assert!(!plan.can_complete());
    }

    #[test]
    fn test_split_zero_slot_blocks() {
        let mut plan = scenario_plan();
        plan.set_split(true);
        plan.set_slot_amount(0, "30").unwrap();

        assert!(matches!(
            plan.assess(),
            Err(ValidationError::SlotAmountNotPositive { slot: 1 })
        ));
    }

    #[test]
    fn test_split_overpayment_is_recorded_as_entered() {
        let mut plan = scenario_plan();
        plan.set_split(true);
        plan.set_slot_amount(0, "20").unwrap();
        plan.set_slot_amount(1, "10").unwrap();

        let breakdown = plan.breakdown().unwrap();
        assert_eq!(breakdown.total_entered().cents(), 3000);
        assert!(plan.change().is_zero());
    }

    #[test]
    fn test_revalidates_after_every_edit() {
        let mut plan = scenario_plan();
        plan.set_amount_received("30");
        assert!(plan.can_complete());

        plan.set_amount_received("3");
        assert!(!plan.can_complete());

        plan.set_amount_received("30");
        plan.set_total(Money::from_cents(3500));
        assert!(!plan.can_complete());

        plan.set_split(true);
        plan.set_slot_amount(0, "20").unwrap();
        plan.set_slot_amount(1, "15").unwrap();
        assert!(plan.can_complete());

        plan.set_slot_amount(1, "").unwrap();
        assert!(!plan.can_complete());
    }

    #[test]
    fn test_amount_setters_sanitize() {
        let mut plan = scenario_plan();
        assert_eq!(plan.set_amount_received("$30.999"), "30.99");
        assert_eq!(plan.set_slot_amount(0, "1a5.5.5").unwrap(), "15.5");
    }

    #[test]
    fn test_bad_slot_index() {
        let mut plan = scenario_plan();
        assert!(plan.set_slot_method(7, "cash").is_err());
        assert!(plan.set_slot_amount(7, "1").is_err());
    }

    #[test]
    fn test_summary() {
        let mut plan = scenario_plan();
        plan.set_amount_received("10");

        let summary = plan.summary();
        assert_eq!(summary.mode, PlanMode::Single);
        assert!(!summary.can_complete);
        assert!(summary.blocked_reason.is_some());

        plan.fill_total();
        let summary = plan.summary();
        assert!(summary.can_complete);
        assert_eq!(summary.blocked_reason, None);
    }
}
