//! Error type for conflict resolution and collision recording.

use thiserror::Error;

/// Primary error type for this crate.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// The persistence layer failed.
    #[error("conflict resolver persistence failed")]
    Data {
        /// Underlying data-layer failure.
        #[source]
        source: cross_seed_data::DataError,
    },
    /// A client failed to confirm removal of an evicted torrent, or the
    /// removal request itself failed. Eviction is all-or-nothing: this
    /// aborts the eviction and leaves all state untouched.
    #[error("client failed to confirm torrent removal")]
    EvictionFailed {
        /// Client host that failed to confirm.
        client_host: String,
        /// Info-hash the eviction was attempted for.
        info_hash: String,
    },
}

/// Result alias for this crate's operations.
pub type ConflictResult<T> = Result<T, ConflictError>;

impl From<cross_seed_data::DataError> for ConflictError {
    fn from(source: cross_seed_data::DataError) -> Self {
        Self::Data { source }
    }
}
