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

//! Persistence layer for the cross-seeding engine's own tables: decisions,
//! collisions, conflict rules, per-client torrent residency, and job
//! bookkeeping.
//!
//! Layout: `error.rs` (`DataError`), `json_array.rs` (the typed,
//! sorted-unique string array codec backing every JSON column), and one
//! repository module per table family (`decision.rs`, `collision.rs`,
//! `conflict_rules.rs`, `client_searchee.rs`, `job_log.rs`, `indexer.rs`).
//! `DataStore::connect` applies this crate's own migrations eagerly before
//! handing back a pool any repository can be built from.

use sqlx::PgPool;

use crate::error::DataResult;

/// Error type for the data access layer.
pub mod error;
/// Typed, sorted-unique string array JSON column codec.
pub mod json_array;

/// Searchee identity repository.
pub mod searchee;
/// Decision row repository.
pub mod decision;
/// Collision row repository.
pub mod collision;
/// Conflict-rule set repository.
pub mod conflict_rules;
/// Per-client torrent residency repository.
pub mod client_searchee;
/// Indexer tracker-set repository.
pub mod indexer;
/// Scheduler job-run bookkeeping repository.
pub mod job_log;

pub use error::{DataError, DataResult as Result};

/// Owns the connection pool and applies this crate's migrations.
#[derive(Clone)]
pub struct DataStore {
    pool: PgPool,
}

impl DataStore {
    /// Connect to `database_url` and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or
    /// migrations fail to apply.
    pub async fn connect(database_url: &str) -> DataResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "pool.connect",
                source,
            })?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail to apply.
    pub async fn from_pool(pool: PgPool) -> DataResult<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|source| DataError::MigrationFailed { source })?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
