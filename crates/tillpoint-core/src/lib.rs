//! # tillpoint-core: Pure Checkout Logic
//!
//! The cart, the payment plan and the values a sale is made of, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal UI (external)                       │   │
//! │  │    Product grid ──► Cart panel ──► Tender screen ──► Receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              tillpoint-checkout (pipeline)                      │   │
//! │  │    number → commit → settle, outcome for the UI                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tillpoint-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │  payment  │  │   sale    │  │   money   │  │   │
//! │  │   │   Cart    │  │ PaymentPlan│ │ SaleDraft │  │   Money   │  │   │
//! │  │   │ CartLine  │  │ Catalog   │  │SaleRecord │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tillpoint-db (Database Layer)                    │   │
//! │  │     SQLite ledger, atomic counters, migrations, repositories    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart model (lines, quantities, notes, badge counters)
//! - [`payment`] - Payment plan validator and method catalog
//! - [`sale`] - Sale drafts and records
//! - [`order_number`] - Order number formatting
//! - [`types`] - Domain types (products, methods, breakdowns, stock)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::{Cart, CatalogProduct, Money};
//!
//! let mut cart = Cart::new();
//! cart.add_item_with_quantity(&CatalogProduct::new("p1", "Burger", Money::from_cents(1000)), 2);
//! cart.add_item(&CatalogProduct::new("p2", "Soda", Money::from_cents(550)));
//!
//! assert_eq!(cart.total().cents(), 2550);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod order_number;
pub mod payment;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tillpoint_core::Money` instead of
// `use tillpoint_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{sanitize_amount_input, Money};
pub use order_number::{OrderNumber, ORDER_NUMBER_WIDTH};
pub use payment::{MethodCatalog, PaymentPlan, PlanMode, PlanSummary, SplitSlot};
pub use sale::{SaleDraft, SaleLine, SaleRecord};
pub use types::*;
