//! # Sale Repository
//!
//! Writes completed sales and reads them back.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        commit(&SaleDraft)                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT sales          (header, totals, legacy payment_method)        │
//! │    INSERT sale_items     (one row per line, name/price snapshots)       │
//! │    INSERT sale_payments  (one row per allocation)                       │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls everything back: no header without its lines.        │
//! │  (business_id, order_number) is unique: a number is never reused.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable here. Status changes belong to order management.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tillpoint_core::{
    Money, OrderNumber, PaymentAllocation, PaymentBreakdown, SaleDraft, SaleLine, SaleRecord,
    SaleStatus,
};

/// Default page size for [`SaleRepository::list`].
pub const DEFAULT_SALE_PAGE: i64 = 50;

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    business_id: String,
    user_id: String,
    order_number: String,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_method: String,
    is_split: bool,
    status: SaleStatus,
    order_type: String,
    created_from: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    position: i64,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
    note: Option<String>,
}

impl From<ItemRow> for SaleLine {
    fn from(row: ItemRow) -> Self {
        SaleLine {
            position: row.position,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
            line_total: Money::from_cents(row.line_total_cents),
            note: row.note,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    method_code: String,
    amount_cents: i64,
}

const SALE_COLUMNS: &str = r#"
    id, business_id, user_id, order_number,
    subtotal_cents, discount_cents, total_cents,
    payment_method, is_split, status, order_type, created_from, created_at
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Writes a sale with its lines and payments in one transaction.
    ///
    /// ## Errors
    /// * [`DbError::UniqueViolation`] - the order number is already used
    ///   by this business, or two lines share a position
    /// * anything else the database reports; nothing is written
    ///
    /// Committing a draft whose id is already stored writes nothing and
    /// returns the stored sale.
    pub async fn commit(&self, draft: &SaleDraft) -> DbResult<SaleRecord> {
        debug!(
            sale_id = %draft.id,
            order_number = %draft.order_number,
            lines = draft.lines.len(),
            "Committing sale"
        );

        let mut tx = self.pool.begin().await?;

        let header = sqlx::query(
            r#"
            INSERT INTO sales (
                id, business_id, user_id, order_number,
                subtotal_cents, discount_cents, total_cents,
                payment_method, is_split, status, order_type, created_from, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.business_id)
        .bind(&draft.user_id)
        .bind(draft.order_number.as_str())
        .bind(draft.subtotal.cents())
        .bind(draft.discount.cents())
        .bind(draft.total.cents())
        .bind(&draft.payment_method)
        .bind(draft.payment_breakdown.split)
        .bind(draft.status)
        .bind(&draft.order_type)
        .bind(&draft.created_from)
        .bind(draft.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = header {
            let err = DbError::from(err);
            if err.is_duplicate_of("sales.id") {
                tx.rollback().await?;
                if let Some(stored) = self.get_by_id(&draft.id).await? {
                    info!(
                        sale_id = %stored.id,
                        order_number = %stored.order_number,
                        "Sale was already committed"
                    );
                    return Ok(stored);
                }
            }
            return Err(err);
        }

        for line in &draft.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, position, product_id, product_name,
                    quantity, unit_price_cents, line_total_cents, note
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&draft.id)
            .bind(line.position)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_total.cents())
            .bind(&line.note)
            .execute(&mut *tx)
            .await?;
        }

        for (position, allocation) in draft.payment_breakdown.methods.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_payments (id, sale_id, position, method_code, amount_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&draft.id)
            .bind(position as i64)
            .bind(&allocation.code)
            .bind(allocation.amount.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %draft.id,
            order_number = %draft.order_number,
            total = %draft.total,
            "Sale committed"
        );

        Ok(SaleRecord::from(draft.clone()))
    }

    /// Gets a sale with its lines and payments.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sales WHERE id = ?1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Finds a sale by its order number within a business.
    pub async fn get_by_order_number(
        &self,
        business_id: &str,
        order_number: &str,
    ) -> DbResult<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sales WHERE business_id = ?1 AND order_number = ?2",
            SALE_COLUMNS
        ))
        .bind(business_id)
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Latest sales of a business, newest first.
    pub async fn list(&self, business_id: &str, limit: i64) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sales WHERE business_id = ?1 ORDER BY created_at DESC, order_number DESC LIMIT ?2",
            SALE_COLUMNS
        ))
        .bind(business_id)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(self.hydrate(row).await?);
        }
        Ok(sales)
    }

    /// Counts sales of a business.
    pub async fn count(&self, business_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE business_id = ?1")
            .bind(business_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Loads the lines and payments of a sale header.
    async fn hydrate(&self, row: SaleRow) -> DbResult<SaleRecord> {
        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT position, product_id, product_name, quantity,
                   unit_price_cents, line_total_cents, note
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let payments: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT method_code, amount_cents
            FROM sale_payments
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        if items.is_empty() {
            return Err(DbError::Internal(format!("sale {} has no lines", row.id)));
        }

        let total = Money::from_cents(row.total_cents);
        // Sales written before per-method rows carry only the legacy column
        let payment_breakdown = if payments.is_empty() {
            PaymentBreakdown::single(row.payment_method.clone(), total)
        } else {
            PaymentBreakdown {
                split: row.is_split,
                methods: payments
                    .into_iter()
                    .map(|p| PaymentAllocation {
                        code: p.method_code,
                        amount: Money::from_cents(p.amount_cents),
                    })
                    .collect(),
            }
        };

        Ok(SaleRecord {
            id: row.id,
            business_id: row.business_id,
            user_id: row.user_id,
            order_number: OrderNumber::from_stored(row.order_number),
            lines: items.into_iter().map(SaleLine::from).collect(),
            subtotal: Money::from_cents(row.subtotal_cents),
            discount: Money::from_cents(row.discount_cents),
            total,
            payment_method: row.payment_method,
            payment_breakdown,
            status: row.status,
            order_type: row.order_type,
            created_from: row.created_from,
            created_at: row.created_at,
        })
    }
}
