//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Postgres Error (sqlx::Error)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       │   Any DbError inside a workflow body rolls the whole           │
//! │       │   transaction back - no write survives a failed commit.        │
//! │       ▼                                                                 │
//! │  API layer (out of scope) maps to caller-facing responses             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bento_core::CoreError;
use thiserror::Error;

/// Postgres SQLSTATE for unique constraint violations.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for foreign key violations.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Database operation errors.
///
/// These errors wrap sqlx errors and carry the domain errors raised by
/// workflow bodies, so one `DbResult` flows through the whole layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A locking read (`FOR UPDATE`) matched no row
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate (merchant, user) membership pair
    /// - Duplicate (voucher, user) claim
    /// - Duplicate claim id in the refund ledger (idempotency backstop)
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Business rule violation raised inside a workflow body.
    ///
    /// The transaction is rolled back before this surfaces to the caller.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction begin/commit failed.
    ///
    /// ## When This Occurs
    /// - Lock timeout, serialization failure, connection loss mid-commit
    /// Transient: the caller may retry the whole workflow.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// sqlx::Error::Database (23505)   → DbError::UniqueViolation
/// sqlx::Error::Database (23503)   → DbError::ForeignKeyViolation
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// Other                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                // Postgres reports constraint class via SQLSTATE codes.
                match db_err.code().as_deref() {
                    Some(PG_UNIQUE_VIOLATION) => DbError::UniqueViolation {
                        constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                    },
                    Some(PG_FOREIGN_KEY_VIOLATION) => DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    },
                    _ => DbError::QueryFailed(db_err.message().to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<bento_core::ValidationError> for DbError {
    fn from(err: bento_core::ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let err = DbError::not_found("Order", "o-123");
        assert_eq!(err.to_string(), "Order not found: o-123");
    }

    #[test]
    fn test_row_not_found_mapping() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_core_error_passthrough() {
        let core = CoreError::InsufficientDeposit {
            available_cents: 1000,
            requested_cents: 3000,
        };
        let err: DbError = core.into();
        // transparent: the domain message survives unchanged
        assert_eq!(
            err.to_string(),
            "Insufficient deposit: available 1000, requested 3000"
        );
    }
}
