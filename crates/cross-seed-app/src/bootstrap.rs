//! Application bootstrap wiring: config, persistence, cache, and the job
//! scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cross_seed_cache::TorrentCache;
use cross_seed_data::collision::CollisionStore;
use cross_seed_data::decision::DecisionStore;
use cross_seed_data::job_log::JobLogStore;
use cross_seed_data::DataStore;
use cross_seed_scheduler::{BulkSearcher, Job, JobName, Scheduler, CADENCE_CLEANUP};
use tokio::sync::watch;
use tracing::info;

use crate::cleanup::CleanupExecutor;
use crate::error::{AppError, AppResult};

const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Collaborators the embedding host may supply in addition to what this
/// crate builds on its own. The indexer client, torrent-client driver,
/// and bulk-search RPC transport are out of scope for this crate; a host
/// that wires them in passes the resulting `BulkSearcher` here so
/// `COLLISION_RECHECK` can run.
#[derive(Default, Clone)]
pub struct Collaborators {
    /// Bulk-search collaborator backing `COLLISION_RECHECK`'s re-search
    /// step. Required only when `use_client_torrents` is configured.
    pub bulk_searcher: Option<Arc<dyn BulkSearcher>>,
}

/// Entry point for the application boot sequence: loads configuration from
/// `config_path` (or `CROSS_SEED_CONFIG_PATH`, defaulting to
/// `cross-seed.yaml`), wires persistence and the scheduler, and runs until
/// a `ctrl_c` signal arrives.
///
/// # Errors
///
/// Returns an error if configuration, persistence, or the scheduler fail
/// to initialize, or if a registered job raises a fatal error.
pub async fn run_app(config_path: Option<PathBuf>, collaborators: Collaborators) -> AppResult<()> {
    init_logging();

    let path = config_path.unwrap_or_else(default_config_path);
    info!(path = %path.display(), "loading configuration");
    let config = cross_seed_config::load(&path).map_err(|source| AppError::config("config.load", source))?;

    let data = DataStore::connect(&config.database_url)
        .await
        .map_err(|source| AppError::data("data_store.connect", source))?;
    let cache = TorrentCache::open(&config.torrent_cache_dir)
        .await
        .map_err(|source| AppError::cache("torrent_cache.open", source))?;

    let scheduler = build_scheduler(&config, &data, &cache, collaborators);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    info!("cross-seed-rs scheduler starting");
    scheduler
        .run(TICK_INTERVAL, shutdown_rx)
        .await
        .map_err(|source| AppError::scheduler("scheduler.run", source))?;
    info!("cross-seed-rs scheduler stopped");
    Ok(())
}

fn build_scheduler(
    config: &cross_seed_config::Config,
    data: &DataStore,
    cache: &TorrentCache,
    collaborators: Collaborators,
) -> Scheduler {
    let job_log = JobLogStore::new(data.pool().clone());
    let mut scheduler = Scheduler::new(job_log);

    let cleanup_cadence = config.job_cadences.cleanup_secs.map_or(CADENCE_CLEANUP, Duration::from_secs);
    let decisions = DecisionStore::new(data.pool().clone());
    let cleanup = CleanupExecutor::new(cache.clone(), decisions);
    scheduler.register(Job::new(JobName::Cleanup, cleanup_cadence, Arc::new(cleanup)));

    let recheck_searcher = collaborators.bulk_searcher.filter(|_| config.use_client_torrents);
    if let Some(bulk_searcher) = recheck_searcher {
        let recheck_cadence = config
            .job_cadences
            .collision_recheck_secs
            .map_or(cross_seed_scheduler::CADENCE_COLLISION_RECHECK, Duration::from_secs);
        let collisions = CollisionStore::new(data.pool().clone());
        let recheck = cross_seed_scheduler::CollisionRecheckExecutor::new(collisions, bulk_searcher);
        scheduler.register(Job::new(JobName::CollisionRecheck, recheck_cadence, Arc::new(recheck)));
    }

    scheduler
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_config_path() -> PathBuf {
    std::env::var("CROSS_SEED_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cross-seed.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_path_falls_back_to_cross_seed_yaml() {
        if std::env::var("CROSS_SEED_CONFIG_PATH").is_err() {
            assert_eq!(default_config_path(), PathBuf::from("cross-seed.yaml"));
        }
    }

    #[tokio::test]
    async fn run_app_surfaces_config_errors_before_touching_persistence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.yaml");
        let err = run_app(Some(path), Collaborators::default()).await.expect_err("should fail");
        assert!(matches!(err, AppError::Config { operation: "config.load", .. }));
    }
}
