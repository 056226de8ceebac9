//! A single named, recurring job and the executor contract it drives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// The six jobs this scheduler registers at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobName {
    /// RSS feed scan.
    Rss,
    /// Bulk search across configured indexers.
    Search,
    /// Refresh per-indexer capability/tracker metadata.
    UpdateIndexerCaps,
    /// Flush queued injections into download clients.
    Inject,
    /// Database and cache housekeeping.
    Cleanup,
    /// Re-check stale cross-tracker collisions against client residency.
    CollisionRecheck,
}

impl JobName {
    /// The persistence key used in `job_log`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rss => "RSS",
            Self::Search => "SEARCH",
            Self::UpdateIndexerCaps => "UPDATE_INDEXER_CAPS",
            Self::Inject => "INJECT",
            Self::Cleanup => "CLEANUP",
            Self::CollisionRecheck => "COLLISION_RECHECK",
        }
    }
}

/// Outcome of a failed job execution: whether it should terminate the
/// process or merely be logged and swallowed.
#[derive(Debug)]
pub enum JobFailure {
    /// A "cross-seed error": propagates to process exit.
    Fatal(Box<dyn std::error::Error + Send + Sync>),
    /// Any other failure: logged and the job resumes on its next tick.
    Transient(Box<dyn std::error::Error + Send + Sync>),
}

/// External behavior a job performs when it runs, with an optional per-run
/// config override supplied by the caller that requested an ahead-of-
/// schedule run.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run one pass of the job.
    async fn execute(&self, config_override: Option<&serde_json::Value>) -> Result<(), JobFailure>;
}

/// A registered job and its mutable scheduling state.
pub struct Job {
    name: JobName,
    cadence: Duration,
    executor: Arc<dyn JobExecutor>,
    should_run: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
    is_active: AtomicBool,
    run_ahead_of_schedule: AtomicBool,
    delay_next_run: AtomicBool,
    config_override: Mutex<Option<serde_json::Value>>,
}

impl Job {
    /// Register a job with a fixed cadence and no run predicate.
    #[must_use]
    pub fn new(name: JobName, cadence: Duration, executor: Arc<dyn JobExecutor>) -> Self {
        Self {
            name,
            cadence,
            executor,
            should_run: None,
            is_active: AtomicBool::new(false),
            run_ahead_of_schedule: AtomicBool::new(false),
            delay_next_run: AtomicBool::new(false),
            config_override: Mutex::new(None),
        }
    }

    /// Attach a predicate gating whether this job is eligible at all, e.g.
    /// `INJECT` only when the configured action is injection.
    #[must_use]
    pub fn with_should_run(mut self, predicate: Arc<dyn Fn() -> bool + Send + Sync>) -> Self {
        self.should_run = Some(predicate);
        self
    }

    /// The job's registered name.
    #[must_use]
    pub const fn name(&self) -> JobName {
        self.name
    }

    /// The job's configured cadence. A zero cadence disables the job.
    #[must_use]
    pub const fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Whether this job is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    /// Request that this job run on the next tick regardless of cadence,
    /// optionally overriding its config for that one run.
    pub async fn run_ahead_of_schedule(&self, config_override: Option<serde_json::Value>) {
        self.run_ahead_of_schedule.store(true, Ordering::SeqCst);
        *self.config_override.lock().await = config_override;
    }

    /// Request that the next persisted `last_run` be pushed forward by one
    /// additional cadence, effectively doubling the interval once.
    pub fn delay_next_run(&self) {
        self.delay_next_run.store(true, Ordering::SeqCst);
    }

    /// Whether this job passes its optional eligibility predicate.
    #[must_use]
    pub fn should_run(&self) -> bool {
        self.should_run.as_ref().is_none_or(|predicate| predicate())
    }

    /// Whether an ahead-of-schedule run has been requested.
    #[must_use]
    pub fn is_run_ahead_requested(&self) -> bool {
        self.run_ahead_of_schedule.load(Ordering::SeqCst)
    }

    /// Run the job's executor, clearing one-shot flags on completion and
    /// returning whether the caller should record a new `last_run`.
    ///
    /// `delay_next_run`, if set, is reported back so the caller can persist
    /// `now + cadence` instead of `now`.
    pub async fn run(&self) -> Result<bool, JobFailure> {
        self.is_active.store(true, Ordering::SeqCst);
        let config_override = self.config_override.lock().await.take();
        let result = self.executor.execute(config_override.as_ref()).await;
        self.run_ahead_of_schedule.store(false, Ordering::SeqCst);
        self.is_active.store(false, Ordering::SeqCst);
        result.map(|()| true)
    }

    /// Consume and clear the one-shot delay-next-run flag.
    pub fn take_delay_next_run(&self) -> bool {
        self.delay_next_run.swap(false, Ordering::SeqCst)
    }
}
