//! # Repository Module
//!
//! One repository per table group. Each owns a clone of the pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout pipeline                                                      │
//! │       │                                                                 │
//! │       │  db.sequences().reserve_next("biz-1")                           │
//! │       │  db.sales().commit(&draft)                                      │
//! │       │  db.products().decrement_stock("biz-1", &update)                │
//! │       ▼                                                                 │
//! │  OrderSequenceRepository   SaleRepository   ProductRepository           │
//! │  PaymentMethodRepository                                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog lookups and stock settlement
//! - [`sale::SaleRepository`] - Transactional sale commit and history
//! - [`sequence::OrderSequenceRepository`] - Per-business order numbers
//! - [`payment_method::PaymentMethodRepository`] - Payment method directory

pub mod payment_method;
pub mod product;
pub mod sale;
pub mod sequence;
