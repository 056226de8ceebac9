//! Per-client torrent residency repository: which download clients hold a
//! given info-hash, and under which trackers they announce it.

use sqlx::{FromRow, PgPool};

use crate::error::{DataError, DataResult};
use crate::json_array;

/// A client's residency record for one info-hash.
#[derive(Debug, Clone, FromRow)]
pub struct ClientSearcheeRow {
    /// Info-hash this row describes.
    pub info_hash: String,
    /// Identifier of the download client holding the torrent.
    pub client_host: String,
    /// Tracker set the client reports for this torrent.
    pub trackers: serde_json::Value,
    /// Whether the client reports the torrent as private.
    pub private: bool,
}

impl ClientSearcheeRow {
    /// Decode the normalized tracker set.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored column is malformed.
    pub fn trackers(&self) -> DataResult<Vec<String>> {
        json_array::decode(&self.trackers, "client_searchee.trackers")
    }
}

/// Repository for the `client_searchee` table.
#[derive(Clone)]
pub struct ClientSearcheeStore {
    pool: PgPool,
}

impl ClientSearcheeStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every client's residency row for `info_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn for_hash(&self, info_hash: &str) -> DataResult<Vec<ClientSearcheeRow>> {
        sqlx::query_as::<_, ClientSearcheeRow>(
            "SELECT info_hash, client_host, trackers, private
             FROM client_searchee WHERE info_hash = $1",
        )
        .bind(info_hash)
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "client_searchee.for_hash",
            source,
        })
    }

    /// Record or refresh a client's residency for an info-hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn upsert(
        &self,
        info_hash: &str,
        client_host: &str,
        trackers: &[String],
        private: bool,
    ) -> DataResult<()> {
        let trackers_json = json_array::encode(trackers);
        sqlx::query(
            "INSERT INTO client_searchee (info_hash, client_host, trackers, private)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (info_hash, client_host) DO UPDATE SET
                 trackers = excluded.trackers,
                 private = excluded.private",
        )
        .bind(info_hash)
        .bind(client_host)
        .bind(&trackers_json)
        .bind(private)
        .execute(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "client_searchee.upsert",
            source,
        })?;
        Ok(())
    }

    /// Whether any client currently holds `info_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn any_client_holds(&self, info_hash: &str) -> DataResult<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM client_searchee WHERE info_hash = $1)",
        )
        .bind(info_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "client_searchee.any_client_holds",
            source,
        })?;
        Ok(row.0)
    }

    /// Remove every residency row for `info_hash`, used once every client
    /// has confirmed the torrent was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn remove_all_for_hash(&self, info_hash: &str) -> DataResult<()> {
        sqlx::query("DELETE FROM client_searchee WHERE info_hash = $1")
            .bind(info_hash)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "client_searchee.remove_all_for_hash",
                source,
            })?;
        Ok(())
    }
}
