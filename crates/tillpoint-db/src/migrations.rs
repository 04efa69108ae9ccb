//! # Schema Migrations
//!
//! The ledger schema ships inside the binary. `Database::new` brings a file
//! or in-memory database up to date before any repository touches it.
//!
//! New schema changes go in a new `migrations/sqlite/NNNN_name.sql` file;
//! applied files are checksummed by sqlx and must not be edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration the database has not seen yet. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let embedded = MIGRATOR.migrations.len();
    info!(embedded, "Applying ledger migrations");

    MIGRATOR.run(pool).await?;

    info!("Ledger schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
///
/// A database that was never migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((embedded, 0));
    }

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((embedded, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn bare_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_before_and_after_migrating() {
        let pool = bare_pool().await;

        let (embedded, applied) = migration_status(&pool).await.unwrap();
        assert!(embedded >= 1);
        assert_eq!(applied, 0);

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert_eq!(migration_status(&pool).await.unwrap(), (embedded, embedded));
    }

    #[tokio::test]
    async fn test_status_reports_query_errors() {
        let pool = bare_pool().await;
        pool.close().await;

        assert!(migration_status(&pool).await.is_err());
    }
}
