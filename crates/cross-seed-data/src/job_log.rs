//! Scheduler job-run bookkeeping repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{DataError, DataResult};

/// Repository for the `job_log` table.
#[derive(Clone)]
pub struct JobLogStore {
    pool: PgPool,
}

impl JobLogStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The timestamp `name` last completed a run, if it ever has.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn last_run(&self, name: &str) -> DataResult<Option<DateTime<Utc>>> {
        let row = sqlx::query_as::<_, (DateTime<Utc>,)>(
            "SELECT last_run FROM job_log WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "job_log.last_run",
            source,
        })?;
        Ok(row.map(|(last_run,)| last_run))
    }

    /// Record that `name` completed a run at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn record_run(&self, name: &str, at: DateTime<Utc>) -> DataResult<()> {
        sqlx::query(
            "INSERT INTO job_log (name, last_run) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET last_run = excluded.last_run",
        )
        .bind(name)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "job_log.record_run",
            source,
        })?;
        Ok(())
    }
}
