//! Indexer tracker-set repository: the persisted, append-only union of
//! tracker hosts observed for each configured indexer.

use cross_seed_model::normalize_trackers;
use sqlx::{FromRow, PgPool};

use crate::error::{DataError, DataResult};
use crate::json_array;

/// A persisted indexer record.
#[derive(Debug, Clone, FromRow)]
pub struct IndexerRow {
    /// Primary key.
    pub id: i64,
    /// Indexer's configured name.
    pub name: String,
    /// Normalized tracker set observed for this indexer.
    pub trackers: serde_json::Value,
}

impl IndexerRow {
    /// Decode the normalized tracker set.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored column is malformed.
    pub fn trackers(&self) -> DataResult<Vec<String>> {
        json_array::decode(&self.trackers, "indexer.trackers")
    }
}

/// Repository for the `indexer` table.
#[derive(Clone)]
pub struct IndexerStore {
    pool: PgPool,
}

impl IndexerStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an indexer by name, creating it with an empty tracker set if
    /// it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_or_create(&self, name: &str) -> DataResult<IndexerRow> {
        sqlx::query_as::<_, IndexerRow>(
            "INSERT INTO indexer (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = excluded.name
             RETURNING id, name, trackers",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "indexer.get_or_create",
            source,
        })
    }

    /// Merge newly observed trackers into an indexer's persisted set. Never
    /// removes a tracker, only grows the union.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored column is
    /// malformed.
    pub async fn merge_trackers(&self, indexer_id: i64, discovered: &[String]) -> DataResult<()> {
        let current = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT trackers FROM indexer WHERE id = $1",
        )
        .bind(indexer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "indexer.merge_trackers.select",
            source,
        })?;

        let mut merged = json_array::decode(&current.0, "indexer.trackers")?;
        merged.extend(discovered.iter().cloned());
        let merged = normalize_trackers(merged);

        sqlx::query("UPDATE indexer SET trackers = $1 WHERE id = $2")
            .bind(json_array::encode(&merged))
            .bind(indexer_id)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "indexer.merge_trackers.update",
                source,
            })?;
        Ok(())
    }

    /// The union of every indexer's tracker set, normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored column is malformed.
    pub async fn all_known_trackers(&self) -> DataResult<Vec<String>> {
        let rows = sqlx::query_as::<_, (serde_json::Value,)>("SELECT trackers FROM indexer")
            .fetch_all(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "indexer.all_known_trackers",
                source,
            })?;

        let mut combined = Vec::new();
        for (trackers,) in rows {
            combined.extend(json_array::decode(&trackers, "indexer.trackers")?);
        }
        Ok(normalize_trackers(combined))
    }
}
