//! The cooperative tick loop: `checkJobs` discipline, at-most-one-in-flight
//! enforcement, and `last_run` persistence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cross_seed_data::job_log::JobLogStore;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::error::{SchedulerError, SchedulerResult};
use crate::job::{Job, JobFailure, JobName};

/// Default cadence for `UPDATE_INDEXER_CAPS`: once a day.
pub const CADENCE_UPDATE_INDEXER_CAPS: Duration = Duration::from_secs(24 * 60 * 60);
/// Default cadence for `INJECT`, when the configured action is injection.
pub const CADENCE_INJECT: Duration = Duration::from_secs(60 * 60);
/// Default cadence for `CLEANUP`: once a day.
pub const CADENCE_CLEANUP: Duration = Duration::from_secs(24 * 60 * 60);
/// Default cadence for `COLLISION_RECHECK`, when `useClientTorrents` is set.
pub const CADENCE_COLLISION_RECHECK: Duration = Duration::from_secs(60 * 60);

/// Registers named jobs and drives their tick discipline.
pub struct Scheduler {
    jobs: Vec<Arc<Job>>,
    job_log: JobLogStore,
    tick_lock: Mutex<()>,
    fatal: Arc<Mutex<Option<SchedulerError>>>,
}

impl Scheduler {
    /// Construct an empty scheduler over `job_log` persistence.
    #[must_use]
    pub fn new(job_log: JobLogStore) -> Self {
        Self {
            jobs: Vec::new(),
            job_log,
            tick_lock: Mutex::new(()),
            fatal: Arc::new(Mutex::new(None)),
        }
    }

    /// Register a job. Call before [`Scheduler::run`].
    pub fn register(&mut self, job: Job) {
        self.jobs.push(Arc::new(job));
    }

    /// Request an immediate run of `name`, optionally overriding its
    /// per-run config. No-op if no job was registered under that name.
    pub async fn run_ahead_of_schedule(&self, name: JobName, config_override: Option<serde_json::Value>) {
        if let Some(job) = self.jobs.iter().find(|job| job.name() == name) {
            job.run_ahead_of_schedule(config_override).await;
        }
    }

    /// One tick: evaluate every registered job's eligibility under the
    /// skip rules and launch the eligible ones. Serialized under
    /// `tick_lock` so overlapping ticks never race.
    ///
    /// # Errors
    ///
    /// Returns an error if an eligibility check against persistence fails.
    pub async fn check_jobs(&self) -> SchedulerResult<()> {
        let _guard = self.tick_lock.lock().await;

        let rss_active = self
            .jobs
            .iter()
            .any(|job| job.name() == JobName::Rss && job.is_active());
        if rss_active {
            return Ok(());
        }

        let any_active = self.jobs.iter().any(|job| job.is_active());

        for job in &self.jobs {
            if !job.should_run() || job.is_active() {
                continue;
            }
            if matches!(job.name(), JobName::Cleanup | JobName::CollisionRecheck) && any_active {
                continue;
            }
            if job.is_run_ahead_requested() || self.is_due(job).await? {
                self.launch(Arc::clone(job));
            }
        }
        Ok(())
    }

    async fn is_due(&self, job: &Job) -> SchedulerResult<bool> {
        if job.cadence().is_zero() {
            return Ok(false);
        }
        let last_run = self.job_log.last_run(job.name().as_str()).await?;
        let Some(last_run) = last_run else {
            return Ok(true);
        };
        let cadence = chrono::Duration::from_std(job.cadence()).unwrap_or(chrono::Duration::MAX);
        Ok(Utc::now() >= last_run + cadence)
    }

    fn launch(&self, job: Arc<Job>) {
        let job_log = self.job_log.clone();
        let fatal = Arc::clone(&self.fatal);
        tokio::spawn(run_and_persist(job, job_log, fatal));
    }

    /// Drive the tick loop until `shutdown` fires, then return once every
    /// in-flight job has finished. Returns the first fatal error raised by
    /// any job's executor, if one occurred.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Fatal`] if a job executor raised a fatal
    /// ("cross-seed") error, or a persistence error from the tick itself.
    pub async fn run(&self, tick_interval: Duration, mut shutdown: watch::Receiver<bool>) -> SchedulerResult<()> {
        let mut ticker = tokio::time::interval(tick_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_jobs().await?;
                    if let Some(err) = self.fatal.lock().await.take() {
                        return Err(err);
                    }
                }
                _ = shutdown.changed() => {
                    info!("scheduler shutting down, awaiting in-flight jobs");
                    break;
                }
            }
        }
        while self.jobs.iter().any(|job| job.is_active()) {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        self.fatal.lock().await.take().map_or(Ok(()), Err)
    }
}

async fn run_and_persist(job: Arc<Job>, job_log: JobLogStore, fatal: Arc<Mutex<Option<SchedulerError>>>) {
    let name = job.name();
    info!(job = name.as_str(), "job starting");
    match job.run().await {
        Ok(did_run) => {
            let delay_next_run = job.take_delay_next_run();
            if did_run {
                let now = Utc::now();
                let cadence = chrono::Duration::from_std(job.cadence()).unwrap_or_default();
                let persisted = if delay_next_run { now + cadence } else { now };
                match job_log.record_run(name.as_str(), persisted).await {
                    Ok(()) => info!(
                        job = name.as_str(),
                        next_run = %(persisted + cadence),
                        "job finished"
                    ),
                    Err(source) => warn!(
                        job = name.as_str(),
                        error = %source,
                        "job finished but failed to persist last_run"
                    ),
                }
            }
        }
        Err(JobFailure::Fatal(source)) => {
            error!(job = name.as_str(), error = %source, "fatal error, terminating process");
            *fatal.lock().await = Some(SchedulerError::Fatal { job: name.as_str(), source });
        }
        Err(JobFailure::Transient(source)) => {
            warn!(job = name.as_str(), error = %source, "job failed, will retry next cycle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::job::JobExecutor;

    struct CountingExecutor {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl JobExecutor for CountingExecutor {
        async fn execute(&self, _config_override: Option<&serde_json::Value>) -> Result<(), JobFailure> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn zero_cadence_job_is_never_eligible_without_run_ahead() {
        let job = Job::new(JobName::Search, Duration::ZERO, Arc::new(CountingExecutor {
            runs: Arc::new(AtomicUsize::new(0)),
        }));
        assert_eq!(job.cadence(), Duration::ZERO);
        assert!(!job.is_run_ahead_requested());
    }
}
