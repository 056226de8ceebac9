//! Collision repository: records of cross-tracker info-hash collisions,
//! keyed one-to-one with the [`decision`](crate::decision) row that raised
//! them, deduplicated against any row already describing the same
//! `(info_hash, searchee_name, candidate_trackers, known_trackers)` tuple.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::{DataError, DataResult};
use crate::json_array;

/// A persisted collision record.
#[derive(Debug, Clone, FromRow)]
pub struct CollisionRow {
    /// Primary key, shared with the owning decision row.
    pub decision_id: i64,
    /// Info-hash both releases share.
    pub info_hash: String,
    /// Name of the searchee the collision was raised against.
    pub searchee_name: String,
    /// Normalized tracker set of the incoming candidate.
    pub candidate_trackers: serde_json::Value,
    /// Normalized tracker set already known for `info_hash`.
    pub known_trackers: serde_json::Value,
    /// Timestamp the collision was first recorded.
    pub first_seen: DateTime<Utc>,
    /// Timestamp the collision was last observed.
    pub last_seen: DateTime<Utc>,
    /// Timestamp of the most recent row mutation.
    pub updated_at: DateTime<Utc>,
}

impl CollisionRow {
    /// Decode the normalized candidate tracker set.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored column is malformed.
    pub fn candidate_trackers(&self) -> DataResult<Vec<String>> {
        json_array::decode(&self.candidate_trackers, "collisions.candidate_trackers")
    }

    /// Decode the normalized known tracker set.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored column is malformed.
    pub fn known_trackers(&self) -> DataResult<Vec<String>> {
        json_array::decode(&self.known_trackers, "collisions.known_trackers")
    }
}

/// Repository for the `collisions` table.
#[derive(Clone)]
pub struct CollisionStore {
    pool: PgPool,
}

impl CollisionStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an existing collision row describing the same tuple, owned by a
    /// decision other than `exclude_decision_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_equivalent(
        &self,
        exclude_decision_id: i64,
        info_hash: &str,
        searchee_name: &str,
        candidate_trackers: &[String],
        known_trackers: &[String],
    ) -> DataResult<Option<CollisionRow>> {
        let candidate_json = json_array::encode(candidate_trackers);
        let known_json = json_array::encode(known_trackers);
        sqlx::query_as::<_, CollisionRow>(
            "SELECT decision_id, info_hash, searchee_name, candidate_trackers, known_trackers,
                    first_seen, last_seen, updated_at
             FROM collisions
             WHERE decision_id != $1
               AND info_hash = $2
               AND searchee_name = $3
               AND candidate_trackers = $4
               AND known_trackers = $5",
        )
        .bind(exclude_decision_id)
        .bind(info_hash)
        .bind(searchee_name)
        .bind(&candidate_json)
        .bind(&known_json)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "collisions.find_equivalent",
            source,
        })
    }

    /// Record a collision for `decision_id`. If an equivalent row already
    /// exists under a different decision, that row's `last_seen` is bumped
    /// and returned instead of creating a duplicate, and any row previously
    /// owned by `decision_id` is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn record(
        &self,
        decision_id: i64,
        info_hash: &str,
        searchee_name: &str,
        candidate_trackers: &[String],
        known_trackers: &[String],
    ) -> DataResult<CollisionRow> {
        if let Some(equivalent) = self
            .find_equivalent(
                decision_id,
                info_hash,
                searchee_name,
                candidate_trackers,
                known_trackers,
            )
            .await?
        {
            self.delete(decision_id).await?;
            return self.touch(equivalent.decision_id).await;
        }

        let candidate_json = json_array::encode(candidate_trackers);
        let known_json = json_array::encode(known_trackers);
        sqlx::query_as::<_, CollisionRow>(
            "INSERT INTO collisions (decision_id, info_hash, searchee_name, candidate_trackers, known_trackers)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (decision_id) DO UPDATE SET
                 info_hash = excluded.info_hash,
                 searchee_name = excluded.searchee_name,
                 candidate_trackers = excluded.candidate_trackers,
                 known_trackers = excluded.known_trackers,
                 last_seen = now(),
                 updated_at = now()
             RETURNING decision_id, info_hash, searchee_name, candidate_trackers, known_trackers,
                       first_seen, last_seen, updated_at",
        )
        .bind(decision_id)
        .bind(info_hash)
        .bind(searchee_name)
        .bind(&candidate_json)
        .bind(&known_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "collisions.record",
            source,
        })
    }

    async fn touch(&self, decision_id: i64) -> DataResult<CollisionRow> {
        sqlx::query_as::<_, CollisionRow>(
            "UPDATE collisions SET last_seen = now(), updated_at = now()
             WHERE decision_id = $1
             RETURNING decision_id, info_hash, searchee_name, candidate_trackers, known_trackers,
                       first_seen, last_seen, updated_at",
        )
        .bind(decision_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "collisions.touch",
            source,
        })
    }

    /// Fetch the collision row owned by `decision_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, decision_id: i64) -> DataResult<Option<CollisionRow>> {
        sqlx::query_as::<_, CollisionRow>(
            "SELECT decision_id, info_hash, searchee_name, candidate_trackers, known_trackers,
                    first_seen, last_seen, updated_at
             FROM collisions WHERE decision_id = $1",
        )
        .bind(decision_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "collisions.get",
            source,
        })
    }

    /// Bump `last_seen`/`updated_at` on an existing row without changing
    /// its payload. No-op when no row exists for `decision_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn refresh(&self, decision_id: i64) -> DataResult<Option<CollisionRow>> {
        if self.get(decision_id).await?.is_none() {
            return Ok(None);
        }
        self.touch(decision_id).await.map(Some)
    }

    /// Remove the collision row owned by `decision_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn delete(&self, decision_id: i64) -> DataResult<()> {
        sqlx::query("DELETE FROM collisions WHERE decision_id = $1")
            .bind(decision_id)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "collisions.delete",
                source,
            })?;
        Ok(())
    }

    /// List every collision whose `info_hash` no longer has any
    /// `client_searchee` residency row, a candidate set for the
    /// collision-recheck job.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_without_client_residency(&self) -> DataResult<Vec<CollisionRow>> {
        sqlx::query_as::<_, CollisionRow>(
            "SELECT c.decision_id, c.info_hash, c.searchee_name, c.candidate_trackers,
                    c.known_trackers, c.first_seen, c.last_seen, c.updated_at
             FROM collisions c
             WHERE NOT EXISTS (
                 SELECT 1 FROM client_searchee cs WHERE cs.info_hash = c.info_hash
             )",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "collisions.list_without_client_residency",
            source,
        })
    }
}
