//! Application-level error type: aggregates every subsystem's typed error
//! behind constant messages with structured context, the same convention
//! each subsystem crate uses internally.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        #[source]
        source: cross_seed_config::ConfigError,
    },
    /// Persistence layer operations failed.
    #[error("persistence operation failed")]
    Data {
        /// Operation identifier.
        operation: &'static str,
        /// Source data error.
        #[source]
        source: cross_seed_data::DataError,
    },
    /// Torrent cache operations failed.
    #[error("torrent cache operation failed")]
    Cache {
        /// Operation identifier.
        operation: &'static str,
        /// Source cache error.
        #[source]
        source: cross_seed_cache::CacheError,
    },
    /// Scheduler operations failed.
    #[error("scheduler operation failed")]
    Scheduler {
        /// Operation identifier.
        operation: &'static str,
        /// Source scheduler error.
        #[source]
        source: cross_seed_scheduler::SchedulerError,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: cross_seed_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn data(operation: &'static str, source: cross_seed_data::DataError) -> Self {
        Self::Data { operation, source }
    }

    pub(crate) const fn cache(operation: &'static str, source: cross_seed_cache::CacheError) -> Self {
        Self::Cache { operation, source }
    }

    pub(crate) const fn scheduler(operation: &'static str, source: cross_seed_scheduler::SchedulerError) -> Self {
        Self::Scheduler { operation, source }
    }
}
