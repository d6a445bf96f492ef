//! Error types for dbutil.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Messages coming from the underlying client are passed through unmodified; the
//! `suggestion` fields only add advice next to them.

use std::fmt;
use thiserror::Error;

/// The finalization step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOperation {
    Commit,
    Rollback,
}

impl fmt::Display for TxOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit => write!(f, "commit"),
            Self::Rollback => write!(f, "rollback"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("DB URL '{url}' is missing '://'")]
    MalformedUrl { url: String },

    #[error("DB URL '{url}' is missing a driver")]
    MissingDriver { url: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("No rows returned")]
    NoRows,

    /// Commit or rollback failed. When a rollback fails after the work itself
    /// failed, the work's error is kept in `original`.
    #[error(
        "Transaction {operation} failed: {message}{}",
        .original.as_ref().map(|e| format!(" (after: {e})")).unwrap_or_default()
    )]
    Finalization {
        operation: TxOperation,
        message: String,
        #[source]
        original: Option<Box<DbError>>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a malformed URL error.
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }

    /// Create a missing driver error.
    pub fn missing_driver(url: impl Into<String>) -> Self {
        Self::MissingDriver { url: url.into() }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a finalization error for a failed commit.
    pub fn commit_failed(cause: DbError) -> Self {
        Self::Finalization {
            operation: TxOperation::Commit,
            message: cause.to_string(),
            original: None,
        }
    }

    /// Create a finalization error for a rollback that failed after `original`.
    pub fn rollback_failed(cause: DbError, original: Option<DbError>) -> Self {
        Self::Finalization {
            operation: TxOperation::Rollback,
            message: cause.to_string(),
            original: original.map(Box::new),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error only means an empty result set.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// The error that started it all.
    ///
    /// For a rollback that failed after the work failed, this is the work's
    /// error; for everything else it is `self`.
    pub fn root_cause(&self) -> &DbError {
        match self {
            Self::Finalization {
                original: Some(original),
                ..
            } => original.root_cause(),
            _ => self,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::NoRows,
            sqlx::Error::PoolTimedOut => DbError::timeout("connection pool acquire"),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                io_err.to_string(),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                tls_err.to_string(),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::TypeNotFound { type_name } => DbError::database(
                format!("Type not found: {}", type_name),
                None,
                "Check the referenced type exists",
            ),
            sqlx::Error::ColumnNotFound(col) => DbError::database(
                format!("Column not found: {}", col),
                None,
                "Check the selected columns match the destination fields",
            ),
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::Encode(source) => {
                DbError::invalid_input(format!("Failed to encode parameter: {}", source))
            }
            sqlx::Error::AnyDriverError(err) => DbError::connection(
                err.to_string(),
                "Check database driver configuration",
            ),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_url_error_messages() {
        assert!(
            DbError::malformed_url("foo")
                .to_string()
                .contains("is missing '://'")
        );
        assert!(
            DbError::missing_driver("://")
                .to_string()
                .contains("is missing a driver")
        );
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::database(
            "Syntax error",
            Some("42601".to_string()),
            "Check SQL syntax",
        );
        assert_eq!(err.suggestion(), Some("Check SQL syntax"));
        assert_eq!(DbError::NoRows.suggestion(), None);
    }

    #[test]
    fn test_row_not_found_maps_to_no_rows() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_no_rows());
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::Timeout { .. }));
    }

    #[test]
    fn test_commit_failed_has_no_original() {
        let err = DbError::commit_failed(DbError::connection("broken pipe", "retry"));
        assert!(err.to_string().contains("Transaction commit failed"));
        assert!(err.to_string().contains("broken pipe"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_rollback_failed_keeps_original() {
        let original = DbError::database("UNIQUE constraint failed", None, "check data");
        let err = DbError::rollback_failed(DbError::connection("reset", "retry"), Some(original));

        let message = err.to_string();
        assert!(message.contains("Transaction rollback failed: Connection failed: reset"));
        assert!(message.contains("UNIQUE constraint failed"));

        let source = err.source().expect("original should be the source");
        assert!(source.to_string().contains("UNIQUE constraint failed"));
        assert!(matches!(err.root_cause(), DbError::Database { .. }));
    }

    #[test]
    fn test_root_cause_of_plain_error_is_itself() {
        let err = DbError::invalid_input("bad");
        assert!(matches!(err.root_cause(), DbError::InvalidInput { .. }));
    }
}
