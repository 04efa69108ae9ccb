//! # Payment Method Repository
//!
//! The per-business directory of tender codes offered at checkout.
//!
//! Codes are unique within a business. Icons are stored by name and fall back
//! to `DollarSign` when a stored name is unknown.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tillpoint_core::validation::validate_business_id;
use tillpoint_core::{MethodIcon, PaymentMethod, TenderKind, ValidationError};

#[derive(Debug, sqlx::FromRow)]
struct MethodRow {
    id: String,
    business_id: String,
    code: String,
    name: String,
    icon: String,
    color: String,
    tender: TenderKind,
    is_active: bool,
    display_order: i64,
}

impl From<MethodRow> for PaymentMethod {
    fn from(row: MethodRow) -> Self {
        PaymentMethod {
            id: row.id,
            business_id: row.business_id,
            code: row.code,
            name: row.name,
            icon: MethodIcon::from_name(&row.icon),
            color: row.color,
            tender: row.tender,
            is_active: row.is_active,
            display_order: row.display_order,
        }
    }
}

/// Repository for payment method database operations.
#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    /// Creates a new PaymentMethodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    /// Inserts a payment method.
    ///
    /// A second method with the same code in the same business is a
    /// [`crate::DbError::UniqueViolation`].
    pub async fn insert(&self, method: &PaymentMethod) -> DbResult<()> {
        validate_business_id(&method.business_id)?;
        if method.code.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "code".to_string(),
            }
            .into());
        }

        debug!(business_id = %method.business_id, code = %method.code, "Inserting payment method");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO payment_methods (
                id, business_id, code, name, icon, color, tender,
                is_active, display_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            "#,
        )
        .bind(&method.id)
        .bind(&method.business_id)
        .bind(&method.code)
        .bind(&method.name)
        .bind(method.icon.as_str())
        .bind(&method.color)
        .bind(method.tender)
        .bind(method.is_active)
        .bind(method.display_order)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All methods of a business, active or not.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<PaymentMethod>> {
        let rows: Vec<MethodRow> = sqlx::query_as(
            r#"
            SELECT id, business_id, code, name, icon, color, tender, is_active, display_order
            FROM payment_methods
            WHERE business_id = ?1
            ORDER BY display_order, created_at
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PaymentMethod::from).collect())
    }

    /// Active methods in display order. This is what checkout offers.
    pub async fn list_active(&self, business_id: &str) -> DbResult<Vec<PaymentMethod>> {
        let rows: Vec<MethodRow> = sqlx::query_as(
            r#"
            SELECT id, business_id, code, name, icon, color, tender, is_active, display_order
            FROM payment_methods
            WHERE business_id = ?1 AND is_active = 1
            ORDER BY display_order, created_at
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(business_id = %business_id, count = rows.len(), "Loaded active payment methods");

        Ok(rows.into_iter().map(PaymentMethod::from).collect())
    }

    /// Turns a method on or off.
    ///
    /// Returns false when the code is unknown for this business.
    pub async fn set_active(&self, business_id: &str, code: &str, active: bool) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payment_methods
            SET is_active = ?3, updated_at = ?4
            WHERE business_id = ?1 AND code = ?2
            "#,
        )
        .bind(business_id)
        .bind(code)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
