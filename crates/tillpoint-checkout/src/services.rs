//! # Service Traits
//!
//! The three collaborators the pipeline talks to, and their SQLite
//! implementation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutPipeline                                                       │
//! │       │                                                                 │
//! │       ├──► CatalogService          get_product        (add-time only)   │
//! │       ├──► PaymentMethodDirectory  list_active_methods                  │
//! │       └──► LedgerStore             reserve_order_number                 │
//! │                                    commit_sale                          │
//! │                                    decrement_stock    (one line)        │
//! │                                                                         │
//! │  impl for tillpoint_db::Database   ◄── production                       │
//! │  impl for test fakes               ◄── failure paths                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use thiserror::Error;

use tillpoint_core::{
    CatalogProduct, MethodCatalog, OrderNumber, PaymentMethod, SaleDraft, SaleRecord,
    StockLevel, StockUpdate,
};
use tillpoint_db::{Database, DbError};

/// Failure reported by a store behind one of the service traits.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The business has no order counter.
    #[error("No order sequence configured for business {business_id}")]
    SequenceMissing { business_id: String },

    /// A stock decrement named a product the store does not know.
    #[error("Product not found: {product_id}")]
    ProductMissing { product_id: String },

    /// The store could not be reached or gave up.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl LedgerError {
    /// Whether trying the same call again can succeed.
    ///
    /// Only contention and connectivity count. A statement SQLite rejected
    /// is rejected again.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::SequenceMissing { .. } | LedgerError::ProductMissing { .. } => false,
            LedgerError::Unavailable(_) => true,
            LedgerError::Database(err) => matches!(
                err,
                DbError::Busy(_) | DbError::ConnectionFailed(_) | DbError::PoolExhausted
            ),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Product lookups used to snapshot a cart line.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn get_product(
        &self,
        business_id: &str,
        product_id: &str,
    ) -> LedgerResult<Option<CatalogProduct>>;
}

/// Writes a sale and its side effects.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Atomically issues the next order number.
    async fn reserve_order_number(&self, business_id: &str) -> LedgerResult<OrderNumber>;

    /// Persists the sale with its lines and payments, all or nothing.
    ///
    /// A draft whose id is already stored returns the stored sale.
    async fn commit_sale(&self, draft: &SaleDraft) -> LedgerResult<SaleRecord>;

    /// Atomically removes sold units of one product, clamped at zero.
    async fn decrement_stock(
        &self,
        business_id: &str,
        update: &StockUpdate,
    ) -> LedgerResult<StockLevel>;
}

/// Read-only directory of payment methods.
#[async_trait]
pub trait PaymentMethodDirectory: Send + Sync {
    /// Active methods in display order.
    async fn list_active_methods(&self, business_id: &str) -> LedgerResult<Vec<PaymentMethod>>;

    async fn method_catalog(&self, business_id: &str) -> LedgerResult<MethodCatalog> {
        Ok(MethodCatalog::new(self.list_active_methods(business_id).await?))
    }
}

// =============================================================================
// SQLite implementation
// =============================================================================

#[async_trait]
impl CatalogService for Database {
    async fn get_product(
        &self,
        business_id: &str,
        product_id: &str,
    ) -> LedgerResult<Option<CatalogProduct>> {
        Ok(self.products().get(business_id, product_id).await?)
    }
}

#[async_trait]
impl LedgerStore for Database {
    async fn reserve_order_number(&self, business_id: &str) -> LedgerResult<OrderNumber> {
        self.sequences()
            .reserve_next(business_id)
            .await?
            .ok_or_else(|| LedgerError::SequenceMissing {
                business_id: business_id.to_string(),
            })
    }

    async fn commit_sale(&self, draft: &SaleDraft) -> LedgerResult<SaleRecord> {
        Ok(self.sales().commit(draft).await?)
    }

    async fn decrement_stock(
        &self,
        business_id: &str,
        update: &StockUpdate,
    ) -> LedgerResult<StockLevel> {
        self.products()
            .decrement_stock(business_id, update)
            .await?
            .ok_or_else(|| LedgerError::ProductMissing {
                product_id: update.product_id.clone(),
            })
    }
}

#[async_trait]
impl PaymentMethodDirectory for Database {
    async fn list_active_methods(&self, business_id: &str) -> LedgerResult<Vec<PaymentMethod>> {
        Ok(self.payment_methods().list_active(business_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::{Money, MethodIcon, TenderKind};
    use tillpoint_db::{DbConfig, NewProduct};

    async fn database() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&NewProduct {
                id: "p1".to_string(),
                business_id: "biz-1".to_string(),
                name: "Latte".to_string(),
                price: Money::from_cents(450),
                current_stock: 3,
                min_stock: 0,
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_missing_sequence_is_reported() {
        let db = database().await;

        let err = db.reserve_order_number("biz-1").await.unwrap_err();
        assert!(matches!(err, LedgerError::SequenceMissing { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unknown_product_decrement() {
        let db = database().await;
        let update = StockUpdate {
            product_id: "ghost".to_string(),
            quantity: 1,
        };

        let err = db.decrement_stock("biz-1", &update).await.unwrap_err();
        assert!(matches!(err, LedgerError::ProductMissing { .. }));
    }

    #[tokio::test]
    async fn test_catalog_and_directory() {
        let db = database().await;
        db.payment_methods()
            .insert(&PaymentMethod {
                id: "m1".to_string(),
                business_id: "biz-1".to_string(),
                code: "cash".to_string(),
                name: "Cash".to_string(),
                icon: MethodIcon::MoneyBill,
                color: "#16a34a".to_string(),
                tender: TenderKind::Cash,
                is_active: true,
                display_order: 0,
            })
            .await
            .unwrap();

        let product = db.get_product("biz-1", "p1").await.unwrap().unwrap();
        assert_eq!(product.price, Money::from_cents(450));

        let catalog = db.method_catalog("biz-1").await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("cash"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LedgerError::Unavailable("timeout".into()).is_retryable());
        assert!(LedgerError::Database(DbError::PoolExhausted).is_retryable());
        assert!(!LedgerError::Database(DbError::duplicate("order_number", "A-1")).is_retryable());
    }

    #[test]
    fn test_only_lock_contention_is_retried() {
        let locked = DbError::from_sqlite_message("database is locked");
        assert!(LedgerError::Database(locked).is_retryable());

        let check = DbError::from_sqlite_message("CHECK constraint failed: current_stock >= 0");
        assert!(!LedgerError::Database(check).is_retryable());

        let syntax = DbError::from_sqlite_message("no such column: stock");
        assert!(!LedgerError::Database(syntax).is_retryable());
    }
}
