//! # tillpoint-checkout: Checkout Pipeline
//!
//! Turns the operator's cart and payment plan into a numbered, persisted
//! sale, then settles inventory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Data Flow                               │
//! │                                                                         │
//! │  Operator                                                               │
//! │     │ add_product / payment_plan / checkout                             │
//! │     ▼                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                tillpoint-checkout (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │  CartState ──► CheckoutPipeline ──► CheckoutOutcome             │   │
//! │  │                    │                                            │   │
//! │  │                    ▼                                            │   │
//! │  │   CatalogService / PaymentMethodDirectory / LedgerStore         │   │
//! │  └────────────────────┼────────────────────────────────────────────┘   │
//! │                       ▼                                                 │
//! │  tillpoint-db (SQLite)        tillpoint-core (Cart, PaymentPlan, Money) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pipeline`] - Numbering, persistence and settlement
//! - [`services`] - Store traits and their SQLite implementation
//! - [`outcome`] - Receipts and the operator-facing result
//! - [`error`] - Pre-commit failures
//! - [`state`] - Shared session cart
//! - [`config`] - TOML + environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_checkout::{CartState, CheckoutConfig, CheckoutPipeline};
//! use tillpoint_db::Database;
//!
//! let config = CheckoutConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let pipeline = CheckoutPipeline::with_database(db, config.pipeline_settings());
//!
//! let cart = CartState::new();
//! cart.add_product(&pipeline, "BEV-000", 2).await?;
//! let mut plan = cart.payment_plan(&pipeline).await?;
//! plan.fill_total();
//! let outcome = cart.checkout(&pipeline, &mut plan).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CheckoutConfig, ConfigError, ConfigResult};
pub use error::{CheckoutError, CheckoutResult, CheckoutStep, SEQUENCE_MISSING_MESSAGE};
pub use outcome::{CheckoutOutcome, CheckoutReceipt, ErrorCode, InventoryStatus, PendingStock};
pub use pipeline::{CheckoutPipeline, PipelineSettings, RetryPolicy};
pub use services::{
    CatalogService, LedgerError, LedgerResult, LedgerStore, PaymentMethodDirectory,
};
pub use state::CartState;
pub use telemetry::init_tracing;
