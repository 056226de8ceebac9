#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Cooperative job scheduler: named recurring jobs (RSS, bulk search,
//! indexer-capability refresh, injection flush, cleanup, collision
//! recheck) driven under a mutual-exclusion tick discipline that prevents
//! overlapping runs.

/// Error type for scheduler operations.
pub mod error;
/// Registered job state machine and the executor contract.
pub mod job;
/// The tick loop and `checkJobs` skip-rule discipline.
pub mod scheduler;
/// Bulk-search collaborator and RPC input-validation rules.
pub mod bulk_search;
/// `COLLISION_RECHECK` executor.
pub mod collision_recheck;

pub use bulk_search::{validate_bulk_search_names, validate_candidates_query, BulkSearchOutcome, BulkSearcher};
pub use collision_recheck::CollisionRecheckExecutor;
pub use error::{SchedulerError, SchedulerResult};
pub use job::{Job, JobExecutor, JobFailure, JobName};
pub use scheduler::{
    Scheduler, CADENCE_CLEANUP, CADENCE_COLLISION_RECHECK, CADENCE_INJECT, CADENCE_UPDATE_INDEXER_CAPS,
};
