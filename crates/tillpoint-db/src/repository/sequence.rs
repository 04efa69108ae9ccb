//! # Order Sequence Repository
//!
//! Issues order numbers, one business at a time.
//!
//! ## Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal A                  SQLite                    Terminal B       │
//! │                                                                         │
//! │  reserve_next("biz") ──► UPDATE ... SET n = n + 1                       │
//! │                          RETURNING n, prefix    ◄── reserve_next("biz") │
//! │                               │                                         │
//! │                   writes serialize on the database lock                 │
//! │                               │                                         │
//! │  ◄── "A-000042"               └──────────────────────► "A-000043"       │
//! │                                                                         │
//! │  No read-then-write: the increment and the read are one statement.      │
//! │  A sale that fails after reserving leaves a gap, never a duplicate.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use tillpoint_core::validation::{validate_business_id, validate_order_prefix};
use tillpoint_core::{OrderNumber, OrderSequence};

#[derive(Debug, sqlx::FromRow)]
struct SequenceRow {
    business_id: String,
    current_number: i64,
    prefix: String,
    updated_at: DateTime<Utc>,
}

impl From<SequenceRow> for OrderSequence {
    fn from(row: SequenceRow) -> Self {
        OrderSequence {
            business_id: row.business_id,
            current_number: row.current_number,
            prefix: row.prefix,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IssuedRow {
    current_number: i64,
    prefix: String,
}

/// Repository for per-business order counters.
#[derive(Debug, Clone)]
pub struct OrderSequenceRepository {
    pool: SqlitePool,
}

impl OrderSequenceRepository {
    /// Creates a new OrderSequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderSequenceRepository { pool }
    }

    /// Creates the counter for a business.
    ///
    /// `start_after` is the last number considered issued: the first
    /// reservation returns `start_after + 1`.
    pub async fn create(
        &self,
        business_id: &str,
        prefix: &str,
        start_after: i64,
    ) -> DbResult<OrderSequence> {
        validate_business_id(business_id)?;
        validate_order_prefix(prefix)?;

        let now = Utc::now();

        info!(business_id = %business_id, prefix = %prefix, "Creating order sequence");

        sqlx::query(
            r#"
            INSERT INTO order_sequences (business_id, current_number, prefix, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(business_id)
        .bind(start_after.max(0))
        .bind(prefix)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(OrderSequence {
            business_id: business_id.to_string(),
            current_number: start_after.max(0),
            prefix: prefix.to_string(),
            updated_at: now,
        })
    }

    /// Gets the counter of a business.
    pub async fn get(&self, business_id: &str) -> DbResult<Option<OrderSequence>> {
        let row: Option<SequenceRow> = sqlx::query_as(
            r#"
            SELECT business_id, current_number, prefix, updated_at
            FROM order_sequences
            WHERE business_id = ?1
            "#,
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderSequence::from))
    }

    /// Atomically issues the next order number.
    ///
    /// ## Returns
    /// * `Ok(Some(number))` - the number now owned by the caller
    /// * `Ok(None)` - no counter configured for this business
    pub async fn reserve_next(&self, business_id: &str) -> DbResult<Option<OrderNumber>> {
        let row: Option<IssuedRow> = sqlx::query_as(
            r#"
            UPDATE order_sequences
            SET current_number = current_number + 1,
                updated_at = ?2
            WHERE business_id = ?1
            RETURNING current_number, prefix
            "#,
        )
        .bind(business_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(business_id = %business_id, "No order sequence configured");
            return Ok(None);
        };

        let number = OrderNumber::format(&row.prefix, row.current_number);
        debug!(
            business_id = %business_id,
            issued = row.current_number,
            order_number = %number,
            "Order number reserved"
        );

        Ok(Some(number))
    }

    /// The number the next reservation would issue. Does not reserve it.
    pub async fn peek_next(&self, business_id: &str) -> DbResult<Option<OrderNumber>> {
        Ok(self
            .get(business_id)
            .await?
            .map(|sequence| sequence.next_order_number()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};

    async fn repo() -> OrderSequenceRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().sequences()
    }

    #[tokio::test]
    async fn test_reserve_after_41() {
        let repo = repo().await;
        repo.create("biz-1", "A-", 41).await.unwrap();

        assert_eq!(
            repo.peek_next("biz-1").await.unwrap().unwrap().as_str(),
            "A-000042"
        );
        assert_eq!(
            repo.reserve_next("biz-1").await.unwrap().unwrap().as_str(),
            "A-000042"
        );
        assert_eq!(
            repo.reserve_next("biz-1").await.unwrap().unwrap().as_str(),
            "A-000043"
        );
        assert_eq!(repo.get("biz-1").await.unwrap().unwrap().current_number, 43);
    }

    #[tokio::test]
    async fn test_peek_does_not_consume() {
        let repo = repo().await;
        repo.create("biz-1", "", 0).await.unwrap();

        repo.peek_next("biz-1").await.unwrap();
        repo.peek_next("biz-1").await.unwrap();

        assert_eq!(
            repo.reserve_next("biz-1").await.unwrap().unwrap().as_str(),
            "000001"
        );
    }

    #[tokio::test]
    async fn test_missing_sequence() {
        let repo = repo().await;

        assert!(repo.reserve_next("nobody").await.unwrap().is_none());
        assert!(repo.peek_next("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequences_are_per_business() {
        let repo = repo().await;
        repo.create("biz-1", "A-", 10).await.unwrap();
        repo.create("biz-2", "B-", 0).await.unwrap();

        assert_eq!(repo.reserve_next("biz-1").await.unwrap().unwrap().as_str(), "A-000011");
        assert_eq!(repo.reserve_next("biz-2").await.unwrap().unwrap().as_str(), "B-000001");
    }

    #[tokio::test]
    async fn test_create_twice_is_duplicate() {
        let repo = repo().await;
        repo.create("biz-1", "", 0).await.unwrap();

        let err = repo.create("biz-1", "", 0).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_prefix() {
        let repo = repo().await;

        let err = repo.create("biz-1", "A B", 0).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
