//! `CLEANUP` job executor: reconciles the on-disk torrent cache against
//! the decision table, removing cached files no decision row still
//! references.

use std::collections::HashSet;

use async_trait::async_trait;
use cross_seed_cache::TorrentCache;
use cross_seed_data::decision::DecisionStore;
use cross_seed_scheduler::{JobExecutor, JobFailure};
use tracing::{info, warn};

/// Removes cached `.torrent` files whose info-hash no decision row
/// references any longer.
pub struct CleanupExecutor {
    cache: TorrentCache,
    decisions: DecisionStore,
}

impl CleanupExecutor {
    /// Construct a cleanup executor over `cache` and `decisions`.
    #[must_use]
    pub const fn new(cache: TorrentCache, decisions: DecisionStore) -> Self {
        Self { cache, decisions }
    }
}

#[async_trait]
impl JobExecutor for CleanupExecutor {
    async fn execute(&self, _config_override: Option<&serde_json::Value>) -> Result<(), JobFailure> {
        let referenced: HashSet<String> = self
            .decisions
            .distinct_cached_info_hashes()
            .await
            .map_err(|source| JobFailure::Transient(Box::new(source)))?
            .into_iter()
            .collect();
        let cached = self
            .cache
            .list_cached_hashes()
            .await
            .map_err(|source| JobFailure::Transient(Box::new(source)))?;

        let mut removed = 0u32;
        for info_hash in cached {
            if referenced.contains(&info_hash) {
                continue;
            }
            match self.cache.remove(&info_hash).await {
                Ok(()) => removed += 1,
                Err(error) => warn!(%info_hash, %error, "failed to remove orphaned cache entry"),
            }
        }
        info!(removed, "cleanup pass complete");
        Ok(())
    }
}
