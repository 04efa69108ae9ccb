//! # tillpoint-db: Database Layer for the Checkout Pipeline
//!
//! SQLite storage for sales, order counters, stock and payment methods,
//! accessed asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Data Flow                               │
//! │                                                                         │
//! │  CheckoutPipeline (tillpoint-checkout)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tillpoint-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ SequenceRepo   │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │   │ 0001_initial │   │   │
//! │  │   │ WAL + busy    │    │ ProductRepo    │   │              │   │   │
//! │  │   │ timeout       │    │ PaymentMethod  │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file shared by the store's terminals                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tillpoint.db")).await?;
//!
//! let number = db.sequences().reserve_next("biz-1").await?;
//! let methods = db.payment_methods().list_active("biz-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::payment_method::PaymentMethodRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::sale::{SaleRepository, DEFAULT_SALE_PAGE};
pub use repository::sequence::OrderSequenceRepository;
