//! Error type for the job scheduler.

use thiserror::Error;

/// Primary error type for this crate.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The persistence layer failed.
    #[error("scheduler persistence failed")]
    Data {
        /// Underlying data-layer failure.
        #[source]
        source: cross_seed_data::DataError,
    },
    /// An executor raised a fatal error, which terminates the process
    /// rather than being logged and swallowed.
    #[error("job {job} raised a fatal error")]
    Fatal {
        /// Name of the job whose executor raised the error.
        job: &'static str,
        /// Underlying fatal failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A bulk-search request violated the RPC input-validation rules.
    #[error("bulk search request rejected: {reason}")]
    InvalidBulkSearch {
        /// Machine-readable rejection reason.
        reason: &'static str,
    },
    /// A candidates listing request violated the RPC input-validation
    /// rules.
    #[error("candidates request rejected: {reason}")]
    InvalidCandidatesQuery {
        /// Machine-readable rejection reason.
        reason: &'static str,
    },
}

/// Result alias for this crate's operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

impl From<cross_seed_data::DataError> for SchedulerError {
    fn from(source: cross_seed_data::DataError) -> Self {
        Self::Data { source }
    }
}
