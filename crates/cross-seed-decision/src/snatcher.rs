//! External collaborator that turns a candidate's download link into
//! metafile bytes.

use async_trait::async_trait;
use std::error::Error;
use thiserror::Error;

/// Failure classes a [`Snatcher`] implementation can report. The decision
/// engine maps each to a specific [`cross_seed_model::Decision`] rather than
/// treating every failure as a generic download error.
#[derive(Debug, Error)]
pub enum SnatchFailure {
    /// The download link resolved to a magnet link rather than a `.torrent`.
    #[error("download link is a magnet link")]
    MagnetLink,
    /// The indexer rate-limited the snatch attempt.
    #[error("snatch was rate limited")]
    RateLimited,
    /// Any other download failure.
    #[error("snatch failed")]
    Other(#[source] Box<dyn Error + Send + Sync>),
}

/// Downloads `.torrent` bytes for a candidate's download link.
#[async_trait]
pub trait Snatcher: Send + Sync {
    /// Fetch the raw `.torrent` bytes behind `link`.
    async fn snatch(&self, link: &str) -> Result<Vec<u8>, SnatchFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysRateLimited;

    #[async_trait]
    impl Snatcher for AlwaysRateLimited {
        async fn snatch(&self, _link: &str) -> Result<Vec<u8>, SnatchFailure> {
            Err(SnatchFailure::RateLimited)
        }
    }

    #[tokio::test]
    async fn snatcher_reports_rate_limited() {
        let snatcher = AlwaysRateLimited;
        let err = snatcher.snatch("https://example.invalid/1").await.unwrap_err();
        assert!(matches!(err, SnatchFailure::RateLimited));
    }
}
