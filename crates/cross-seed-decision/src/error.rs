//! Error types for the decision engine.

use std::error::Error;

use thiserror::Error;

/// Primary error type for decision engine operations.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// The torrent cache failed to store or load a metafile.
    #[error("torrent cache operation failed")]
    Cache {
        /// Underlying cache failure.
        #[source]
        source: cross_seed_cache::CacheError,
    },
    /// The persistence layer failed during the caching wrapper's
    /// transaction.
    #[error("decision persistence failed")]
    Data {
        /// Underlying data-layer failure.
        #[source]
        source: cross_seed_data::DataError,
    },
    /// A metafile could not be parsed from snatched bytes.
    #[error("metafile parse failed")]
    ParseFailed {
        /// Underlying parse failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Result alias for decision engine operations.
pub type DecisionResult<T> = Result<T, DecisionError>;

impl From<cross_seed_cache::CacheError> for DecisionError {
    fn from(source: cross_seed_cache::CacheError) -> Self {
        Self::Cache { source }
    }
}

impl From<cross_seed_data::DataError> for DecisionError {
    fn from(source: cross_seed_data::DataError) -> Self {
        Self::Data { source }
    }
}
