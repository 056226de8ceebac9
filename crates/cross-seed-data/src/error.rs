//! Error type for the data access layer.

use thiserror::Error;

/// Errors raised by the data access layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// Migration execution failed.
    #[error("migration failed")]
    MigrationFailed {
        /// Underlying migration error.
        #[source]
        source: sqlx::migrate::MigrateError,
    },
    /// A database operation failed.
    #[error("database operation failed")]
    QueryFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying SQL error.
        #[source]
        source: sqlx::Error,
    },
    /// A JSON array column did not decode into a `Vec<String>`.
    #[error("tracker array column was malformed")]
    MalformedArray {
        /// Column name.
        column: &'static str,
    },
    /// The requested conflict-rule set failed validation.
    #[error("conflict rule set failed validation")]
    InvalidRuleSet {
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Result alias for data layer operations.
pub type DataResult<T> = Result<T, DataError>;
