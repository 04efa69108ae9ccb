//! # Product Repository
//!
//! Catalog lookups for the cart and stock settlement after a sale.
//!
//! ## Stock Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stock Decrement Strategy                                               │
//! │                                                                         │
//! │  ❌ read stock, compute, write back                                     │
//! │     Terminal A reads 10 ─┐                                              │
//! │     Terminal B reads 10 ─┼─► both write 10 - q → one sale is lost      │
//! │                                                                         │
//! │  ✅ one statement                                                       │
//! │     UPDATE products SET current_stock = MAX(0, current_stock - q)       │
//! │     RETURNING current_stock, min_stock                                  │
//! │                                                                         │
//! │  Concurrent decrements q1..qn leave max(0, initial - Σq).               │
//! │  Stock never goes negative: the clamp runs inside SQLite.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use tillpoint_core::validation::{validate_business_id, validate_price, validate_quantity};
use tillpoint_core::{CatalogProduct, Money, StockLevel, StockUpdate};

/// A product to insert (catalog admin and seeding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub price: Money,
    pub current_stock: i64,
    pub min_stock: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    name: String,
    price_cents: i64,
}

impl From<CatalogRow> for CatalogProduct {
    fn from(row: CatalogRow) -> Self {
        CatalogProduct {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: String,
    current_stock: i64,
    min_stock: i64,
}

impl From<StockRow> for StockLevel {
    fn from(row: StockRow) -> Self {
        StockLevel {
            product_id: row.id,
            current_stock: row.current_stock,
            min_stock: row.min_stock,
        }
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<()> {
        validate_business_id(&product.business_id)?;
        validate_price(product.price)?;

        debug!(id = %product.id, name = %product.name, "Inserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, business_id, name, price_cents,
                current_stock, min_stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.business_id)
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.current_stock.max(0))
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an active product as the cart sees it.
    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Option<CatalogProduct>> {
        let row: Option<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents
            FROM products
            WHERE business_id = ?1 AND id = ?2 AND is_active = 1
            "#,
        )
        .bind(business_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }

    /// Current stock of a product.
    pub async fn stock_level(&self, business_id: &str, id: &str) -> DbResult<Option<StockLevel>> {
        let row: Option<StockRow> = sqlx::query_as(
            r#"
            SELECT id, current_stock, min_stock
            FROM products
            WHERE business_id = ?1 AND id = ?2
            "#,
        )
        .bind(business_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StockLevel::from))
    }

    /// Atomically removes sold units, clamping at zero.
    ///
    /// ## Returns
    /// * `Ok(Some(level))` - stock after the decrement
    /// * `Ok(None)` - no such product for this business
    pub async fn decrement_stock(
        &self,
        business_id: &str,
        update: &StockUpdate,
    ) -> DbResult<Option<StockLevel>> {
        validate_quantity(update.quantity)?;

        let row: Option<StockRow> = sqlx::query_as(
            r#"
            UPDATE products
            SET current_stock = MAX(0, current_stock - ?3),
                updated_at = ?4
            WHERE business_id = ?1 AND id = ?2
            RETURNING id, current_stock, min_stock
            "#,
        )
        .bind(business_id)
        .bind(&update.product_id)
        .bind(update.quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let level = StockLevel::from(row);
                debug!(
                    product_id = %level.product_id,
                    sold = update.quantity,
                    remaining = level.current_stock,
                    "Stock decremented"
                );
                if level.is_low() {
                    warn!(
                        product_id = %level.product_id,
                        remaining = level.current_stock,
                        min_stock = level.min_stock,
                        "Stock running low"
                    );
                }
                Ok(Some(level))
            }
            None => {
                warn!(product_id = %update.product_id, "Stock decrement for unknown product");
                Ok(None)
            }
        }
    }

    /// Counts active products of a business (for diagnostics).
    pub async fn count(&self, business_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE business_id = ?1 AND is_active = 1",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};

    fn new_product(id: &str, stock: i64) -> NewProduct {
        NewProduct {
            id: id.to_string(),
            business_id: "biz-1".to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(1000),
            current_stock: stock,
            min_stock: 2,
        }
    }

    fn sold(product_id: &str, quantity: i64) -> StockUpdate {
        StockUpdate {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_business() {
        let repo = repo().await;
        repo.insert(&new_product("p1", 10)).await.unwrap();

        let product = repo.get("biz-1", "p1").await.unwrap().unwrap();
        assert_eq!(product.name, "Product p1");
        assert_eq!(product.price.cents(), 1000);

        assert!(repo.get("biz-2", "p1").await.unwrap().is_none());
        assert_eq!(repo.count("biz-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_decrement() {
        let repo = repo().await;
        repo.insert(&new_product("p1", 10)).await.unwrap();

        let level = repo.decrement_stock("biz-1", &sold("p1", 3)).await.unwrap().unwrap();
        assert_eq!(level.current_stock, 7);
        assert!(level.is_low());
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let repo = repo().await;
        repo.insert(&new_product("p1", 2)).await.unwrap();

        let level = repo.decrement_stock("biz-1", &sold("p1", 5)).await.unwrap().unwrap();
        assert_eq!(level.current_stock, 0);
        assert_eq!(
            repo.stock_level("biz-1", "p1").await.unwrap().unwrap().current_stock,
            0
        );
    }

    #[tokio::test]
    async fn test_decrement_unknown_product() {
        let repo = repo().await;

        assert!(repo.decrement_stock("biz-1", &sold("ghost", 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decrement_rejects_non_positive_quantity() {
        let repo = repo().await;
        repo.insert(&new_product("p1", 5)).await.unwrap();

        let err = repo.decrement_stock("biz-1", &sold("p1", -3)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(
            repo.stock_level("biz-1", "p1").await.unwrap().unwrap().current_stock,
            5
        );
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_price() {
        let repo = repo().await;
        let mut product = new_product("p1", 5);
        product.price = Money::from_cents(-1);

        assert!(matches!(
            repo.insert(&product).await,
            Err(DbError::Validation(_))
        ));
    }
}
