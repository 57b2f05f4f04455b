//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► CheckoutError (Busy/PoolExhausted → Concurrency,            │
//! │       │                   Business → verbatim, rest → Persistence)     │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← status code + { "error": "..." }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tienda_core::{CheckoutError, CoreError};

/// SQLite primary result codes that mean "try again later".
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A business rule rejected the operation (stock, balance, validation).
    #[error(transparent)]
    Business(#[from] CoreError),

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock or balance).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// SQLITE_BUSY / SQLITE_LOCKED: another writer holds the database.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether a fresh attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → code 5/6 → Busy, else constraint parsing
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record",
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if is_busy(db_err.code().as_deref(), msg) {
                    return DbError::Busy(msg.to_string());
                }

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Extended result codes keep the primary code in the low byte
/// (e.g. 517 = SQLITE_BUSY_SNAPSHOT).
fn is_busy(code: Option<&str>, message: &str) -> bool {
    let primary = code
        .and_then(|c| c.parse::<i64>().ok())
        .map(|c| c & 0xff);

    matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED))
        || message.contains("database is locked")
        || message.contains("database table is locked")
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Storage failures as seen by a checkout.
impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CheckoutError::NotFound { entity, id },
            DbError::Business(core) => core.into(),
            DbError::Busy(msg) => CheckoutError::Concurrency(msg),
            DbError::PoolExhausted => {
                CheckoutError::Concurrency("connection pool exhausted".to_string())
            }
            other => CheckoutError::Persistence(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_detection() {
        assert!(is_busy(Some("5"), "database is locked"));
        assert!(is_busy(Some("517"), "whatever"));
        assert!(is_busy(Some("6"), ""));
        assert!(is_busy(None, "database is locked"));
        assert!(!is_busy(Some("19"), "UNIQUE constraint failed: sales.sale_number"));
    }

    #[test]
    fn test_checkout_mapping() {
        let err: CheckoutError = DbError::Busy("locked".into()).into();
        assert!(err.is_retryable());

        let err: CheckoutError = DbError::PoolExhausted.into();
        assert!(err.is_retryable());

        let err: CheckoutError = DbError::not_found("Customer", "C9").into();
        assert_eq!(
            err,
            CheckoutError::NotFound {
                entity: "Customer",
                id: "C9".to_string()
            }
        );

        let err: CheckoutError = DbError::QueryFailed("disk I/O error".into()).into();
        assert!(matches!(err, CheckoutError::Persistence(_)));
    }
}
