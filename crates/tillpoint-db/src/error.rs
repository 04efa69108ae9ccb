//! # Ledger Store Errors
//!
//! What can go wrong between the checkout layer and SQLite.
//!
//! ```text
//!  sqlx::Error ──► DbError ──► LedgerError ──► CheckoutOutcome::SaleFailed
//!                    │
//!                    └─ Busy / PoolExhausted / ConnectionFailed: worth retrying
//!                       constraint failures: never succeed on a retry
//! ```

use thiserror::Error;
use tillpoint_core::ValidationError;

/// Errors raised by the repositories.
#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE index rejected the row, e.g. a reused order number.
    ///
    /// `field` is `table.column` as SQLite names it.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// A sale item or payment pointing at a missing sale.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// CHECK or NOT NULL rejected the row, e.g. a zero quantity line.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        message: String,
    },

    /// Another connection holds the write lock past the busy timeout.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other error SQLite reported for a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection stayed checked out past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Input rejected before reaching SQLite.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for a UNIQUE violation on exactly `table.column`.
    pub fn is_duplicate_of(&self, field: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field: f, .. } if f == field)
    }

    /// Sorts a SQLite error message into a variant.
    ///
    /// ```text
    /// "UNIQUE constraint failed: sales.id"  → UniqueViolation { field: "sales.id" }
    /// "FOREIGN KEY constraint failed"       → ForeignKeyViolation
    /// "CHECK constraint failed: ..."        → ConstraintViolation
    /// "NOT NULL constraint failed: ..."     → ConstraintViolation
    /// "database is locked" / "... busy"     → Busy
    /// anything else                         → QueryFailed
    /// ```
    pub fn from_sqlite_message(msg: &str) -> Self {
        if let Some(field) = msg.split("UNIQUE constraint failed: ").nth(1) {
            DbError::UniqueViolation {
                field: field.trim().to_string(),
                value: "unknown".to_string(),
            }
        } else if msg.contains("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation {
                message: msg.to_string(),
            }
        } else if msg.contains("CHECK constraint failed")
            || msg.contains("NOT NULL constraint failed")
        {
            DbError::ConstraintViolation {
                message: msg.to_string(),
            }
        } else if msg.contains("database is locked")
            || msg.contains("database table is locked")
            || msg.contains("database is busy")
        {
            DbError::Busy(msg.to_string())
        } else {
            DbError::QueryFailed(msg.to_string())
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
