//! Error type for torrent cache operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the torrent cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing a cached torrent file failed.
    #[error("torrent cache io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The cached payload failed to parse as a valid torrent.
    ///
    /// Parsing itself is an external collaborator; this variant only wraps
    /// whatever error that collaborator returned so the cache can still
    /// perform its best-effort eviction-on-corruption without needing to
    /// understand the bencode format.
    #[error("cached torrent file failed to parse")]
    Corrupt {
        /// Info-hash of the cache entry that failed to parse.
        info_hash: String,
        /// Underlying parse error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
