//! # Domain Types
//!
//! Core domain types used throughout the checkout pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │   │ PaymentMethod   │   │ PaymentBreakdown│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  code (tenant)  │   │  split          │       │
//! │  │  name           │   │  icon, color    │   │  methods[]      │       │
//! │  │  price          │   │  tender         │   │   code, amount  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StockUpdate    │   │   StockLevel    │   │   SaleStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  current_stock  │   │  Pending        │       │
//! │  │  quantity       │   │  min_stock      │   │  Completed ...  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale records live in [`crate::sale`], order numbers in
//! [`crate::order_number`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog Product
// =============================================================================

/// What the catalog hands the cart: enough to snapshot a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogProduct {
    /// Catalog product id. This is the cart's product identity.
    pub id: String,

    /// Display name, frozen into the cart line at add-time.
    pub name: String,

    /// Unit price, frozen into the cart line at add-time.
    pub price: Money,
}

impl CatalogProduct {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// Counter sales are written as `Completed`. The other states belong to
/// order management and are only read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    InPreparation,
    Ready,
    /// Paid and handed over.
    Completed,
    Cancelled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Whether a method can hand back change.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderKind {
    /// Physical cash: the operator types what was received.
    Cash,
    /// Card, transfer, QR... always charged for the exact amount.
    Electronic,
}

impl TenderKind {
    #[inline]
    pub const fn gives_change(&self) -> bool {
        matches!(self, TenderKind::Cash)
    }
}

/// Icon shown on a payment method button.
///
/// Stored as a name in the directory. Unknown names fall back to
/// [`MethodIcon::DollarSign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MethodIcon {
    DollarSign,
    CreditCard,
    ExchangeAlt,
    QrCode,
    Wallet,
    MoneyBillWave,
    Mobile,
    Coins,
    University,
    MoneyBill,
    BankNote,
}

impl MethodIcon {
    /// Every icon, in picker order.
    pub const ALL: [MethodIcon; 11] = [
        MethodIcon::DollarSign,
        MethodIcon::CreditCard,
        MethodIcon::ExchangeAlt,
        MethodIcon::QrCode,
        MethodIcon::Wallet,
        MethodIcon::MoneyBillWave,
        MethodIcon::Mobile,
        MethodIcon::Coins,
        MethodIcon::University,
        MethodIcon::MoneyBill,
        MethodIcon::BankNote,
    ];

    /// Resolves a stored icon name.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::types::MethodIcon;
    ///
    /// assert_eq!(MethodIcon::from_name("CreditCard"), MethodIcon::CreditCard);
    /// assert_eq!(MethodIcon::from_name("Bitcoin"), MethodIcon::DollarSign);
    /// ```
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|icon| icon.as_str() == name)
            .unwrap_or(MethodIcon::DollarSign)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            MethodIcon::DollarSign => "DollarSign",
            MethodIcon::CreditCard => "CreditCard",
            MethodIcon::ExchangeAlt => "ExchangeAlt",
            MethodIcon::QrCode => "QrCode",
            MethodIcon::Wallet => "Wallet",
            MethodIcon::MoneyBillWave => "MoneyBillWave",
            MethodIcon::Mobile => "Mobile",
            MethodIcon::Coins => "Coins",
            MethodIcon::University => "University",
            MethodIcon::MoneyBill => "MoneyBill",
            MethodIcon::BankNote => "BankNote",
        }
    }
}

impl Default for MethodIcon {
    fn default() -> Self {
        MethodIcon::DollarSign
    }
}

/// A payment method from the business's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub business_id: String,
    /// Tenant-scoped code recorded on sales ("cash", "card", ...).
    pub code: String,
    pub name: String,
    pub icon: MethodIcon,
    /// Button color, e.g. `#16a34a`.
    pub color: String,
    pub tender: TenderKind,
    pub is_active: bool,
    pub display_order: i64,
}

// =============================================================================
// Payment Breakdown
// =============================================================================

/// One method/amount pair of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentAllocation {
    pub code: String,
    pub amount: Money,
}

/// How a sale was paid.
///
/// ## Shapes
/// ```text
/// single: { split: false, methods: [{ code: "cash", amount: total }] }
/// split:  { split: true,  methods: [{ code: "cash", amount: 15.00 },
///                                   { code: "card", amount: 10.50 }] }
/// ```
/// Split amounts are recorded as entered, overpayment included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub split: bool,
    pub methods: Vec<PaymentAllocation>,
}

impl PaymentBreakdown {
    /// Breakdown for a single method covering the whole total.
    pub fn single(code: impl Into<String>, total: Money) -> Self {
        Self {
            split: false,
            methods: vec![PaymentAllocation {
                code: code.into(),
                amount: total,
            }],
        }
    }

    /// Sum of every allocation.
    pub fn total_entered(&self) -> Money {
        self.methods.iter().map(|m| m.amount).sum()
    }

    /// Code stored in the single-method `payment_method` column.
    ///
    /// First method's code, or `"cash"` for an empty breakdown.
    pub fn primary_code(&self) -> &str {
        self.methods
            .first()
            .map(|m| m.code.as_str())
            .unwrap_or(DEFAULT_PAYMENT_CODE)
    }
}

/// Legacy payment code used when a breakdown has no methods.
pub const DEFAULT_PAYMENT_CODE: &str = "cash";

// =============================================================================
// Inventory
// =============================================================================

/// One stock decrement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockUpdate {
    pub product_id: String,
    pub quantity: i64,
}

/// Stock of a product after settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLevel {
    pub product_id: String,
    pub current_stock: i64,
    pub min_stock: i64,
}

/// Distance above `min_stock` at which a product counts as running low.
pub const LOW_STOCK_MARGIN: i64 = 5;

impl StockLevel {
    /// Running low: in stock and at most [`LOW_STOCK_MARGIN`] above minimum.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::types::StockLevel;
    ///
    /// let level = StockLevel { product_id: "p1".into(), current_stock: 8, min_stock: 5 };
    /// assert!(level.is_low());
    /// ```
    pub fn is_low(&self) -> bool {
        let headroom = self.current_stock - self.min_stock;
        self.current_stock > 0 && (1..=LOW_STOCK_MARGIN).contains(&headroom)
    }

    #[inline]
    pub fn is_out(&self) -> bool {
        self.current_stock <= 0
    }
}

// =============================================================================
// Order Sequence
// =============================================================================

/// Per-business order counter as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSequence {
    pub business_id: String,
    /// Last number issued. Zero for a fresh sequence.
    pub current_number: i64,
    /// May be empty.
    pub prefix: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
