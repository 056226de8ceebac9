//! Decision row repository: `(searchee_id, guid) -> decision` with
//! timestamps, unique per pair.

use chrono::{DateTime, Utc};
use cross_seed_model::Decision;
use sqlx::{FromRow, PgPool, Row};

use crate::error::{DataError, DataResult};

fn decision_to_str(decision: Decision) -> &'static str {
    match decision {
        Decision::Match => "MATCH",
        Decision::MatchSizeOnly => "MATCH_SIZE_ONLY",
        Decision::MatchPartial => "MATCH_PARTIAL",
        Decision::SizeMismatch => "SIZE_MISMATCH",
        Decision::PartialSizeMismatch => "PARTIAL_SIZE_MISMATCH",
        Decision::FileTreeMismatch => "FILE_TREE_MISMATCH",
        Decision::ReleaseGroupMismatch => "RELEASE_GROUP_MISMATCH",
        Decision::ResolutionMismatch => "RESOLUTION_MISMATCH",
        Decision::SourceMismatch => "SOURCE_MISMATCH",
        Decision::ProperRepackMismatch => "PROPER_REPACK_MISMATCH",
        Decision::FuzzySizeMismatch => "FUZZY_SIZE_MISMATCH",
        Decision::NoDownloadLink => "NO_DOWNLOAD_LINK",
        Decision::BlockedRelease => "BLOCKED_RELEASE",
        Decision::MagnetLink => "MAGNET_LINK",
        Decision::RateLimited => "RATE_LIMITED",
        Decision::DownloadFailed => "DOWNLOAD_FAILED",
        Decision::SameInfoHash => "SAME_INFO_HASH",
        Decision::InfoHashAlreadyExists => "INFO_HASH_ALREADY_EXISTS",
        Decision::InfoHashAlreadyExistsAnotherTracker => {
            "INFO_HASH_ALREADY_EXISTS_ANOTHER_TRACKER"
        }
    }
}

fn decision_from_str(value: &str) -> DataResult<Decision> {
    Ok(match value {
        "MATCH" => Decision::Match,
        "MATCH_SIZE_ONLY" => Decision::MatchSizeOnly,
        "MATCH_PARTIAL" => Decision::MatchPartial,
        "SIZE_MISMATCH" => Decision::SizeMismatch,
        "PARTIAL_SIZE_MISMATCH" => Decision::PartialSizeMismatch,
        "FILE_TREE_MISMATCH" => Decision::FileTreeMismatch,
        "RELEASE_GROUP_MISMATCH" => Decision::ReleaseGroupMismatch,
        "RESOLUTION_MISMATCH" => Decision::ResolutionMismatch,
        "SOURCE_MISMATCH" => Decision::SourceMismatch,
        "PROPER_REPACK_MISMATCH" => Decision::ProperRepackMismatch,
        "FUZZY_SIZE_MISMATCH" => Decision::FuzzySizeMismatch,
        "NO_DOWNLOAD_LINK" => Decision::NoDownloadLink,
        "BLOCKED_RELEASE" => Decision::BlockedRelease,
        "MAGNET_LINK" => Decision::MagnetLink,
        "RATE_LIMITED" => Decision::RateLimited,
        "DOWNLOAD_FAILED" => Decision::DownloadFailed,
        "SAME_INFO_HASH" => Decision::SameInfoHash,
        "INFO_HASH_ALREADY_EXISTS" => Decision::InfoHashAlreadyExists,
        "INFO_HASH_ALREADY_EXISTS_ANOTHER_TRACKER" => {
            Decision::InfoHashAlreadyExistsAnotherTracker
        }
        _ => return Err(DataError::MalformedArray { column: "decision" }),
    })
}

/// A persisted `(searchee_id, guid)` decision, as stored.
#[derive(Debug, Clone, FromRow)]
pub struct DecisionRow {
    /// Surrogate primary key, used by the collision repository's foreign key.
    pub id: i64,
    /// Owning searchee's primary key.
    pub searchee_id: i64,
    /// Indexer-unique guid for the candidate that produced this decision.
    pub guid: String,
    /// Info-hash, present iff the candidate was successfully snatched.
    pub info_hash: Option<String>,
    /// Raw decision tag, as stored (decode via [`DecisionRow::decision`]).
    #[sqlx(rename = "decision")]
    pub decision_raw: String,
    /// Timestamp of the first assessment for this key.
    pub first_seen: DateTime<Utc>,
    /// Timestamp of the most recent assessment for this key.
    pub last_seen: DateTime<Utc>,
    /// Fuzzy-size tolerance in effect when this decision was taken.
    pub fuzzy_size_factor: f64,
}

impl DecisionRow {
    /// Decode the stored decision tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored tag is not a recognized decision.
    pub fn decision(&self) -> DataResult<Decision> {
        decision_from_str(&self.decision_raw)
    }
}

/// Repository for the `decision` table.
#[derive(Clone)]
pub struct DecisionStore {
    pool: PgPool,
}

impl DecisionStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the current row for `(searchee_id, guid)`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, searchee_id: i64, guid: &str) -> DataResult<Option<DecisionRow>> {
        sqlx::query_as::<_, DecisionRow>(
            "SELECT id, searchee_id, guid, info_hash, decision, first_seen, last_seen, fuzzy_size_factor
             FROM decision WHERE searchee_id = $1 AND guid = $2",
        )
        .bind(searchee_id)
        .bind(guid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "decision.get",
            source,
        })
    }

    /// Insert or fully overwrite the decision for `(searchee_id, guid)`.
    /// `first_seen` is preserved across updates; `last_seen` is always
    /// bumped to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert(
        &self,
        searchee_id: i64,
        guid: &str,
        info_hash: Option<&str>,
        decision: Decision,
        fuzzy_size_factor: f64,
    ) -> DataResult<DecisionRow> {
        sqlx::query_as::<_, DecisionRow>(
            "INSERT INTO decision (searchee_id, guid, info_hash, decision, fuzzy_size_factor)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (searchee_id, guid) DO UPDATE SET
                 info_hash = excluded.info_hash,
                 decision = excluded.decision,
                 fuzzy_size_factor = excluded.fuzzy_size_factor,
                 last_seen = now()
             RETURNING id, searchee_id, guid, info_hash, decision, first_seen, last_seen, fuzzy_size_factor",
        )
        .bind(searchee_id)
        .bind(guid)
        .bind(info_hash)
        .bind(decision_to_str(decision))
        .bind(fuzzy_size_factor)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "decision.upsert",
            source,
        })
    }

    /// Bump `last_seen` without altering the stored decision or info-hash,
    /// used by the caching wrapper's excluded-info-hash short-circuit so a
    /// reassessment doesn't regress a previously matched decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn touch_last_seen(&self, id: i64) -> DataResult<()> {
        sqlx::query("UPDATE decision SET last_seen = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "decision.touch_last_seen",
                source,
            })?;
        Ok(())
    }

    /// Fetch the info-hash associated with every decision row holding
    /// `info_hash`, used by cleanup to reconcile the torrent cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn distinct_cached_info_hashes(&self) -> DataResult<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT info_hash FROM decision WHERE info_hash IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "decision.distinct_cached_info_hashes",
                source,
            })?;
        rows.into_iter()
            .map(|row| {
                row.try_get::<String, _>("info_hash")
                    .map_err(|source| DataError::QueryFailed {
                        operation: "decision.distinct_cached_info_hashes.decode",
                        source,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_round_trips_through_string_form() {
        for decision in [
            Decision::Match,
            Decision::MatchSizeOnly,
            Decision::MatchPartial,
            Decision::SizeMismatch,
            Decision::PartialSizeMismatch,
            Decision::FileTreeMismatch,
            Decision::ReleaseGroupMismatch,
            Decision::ResolutionMismatch,
            Decision::SourceMismatch,
            Decision::ProperRepackMismatch,
            Decision::FuzzySizeMismatch,
            Decision::NoDownloadLink,
            Decision::BlockedRelease,
            Decision::MagnetLink,
            Decision::RateLimited,
            Decision::DownloadFailed,
            Decision::SameInfoHash,
            Decision::InfoHashAlreadyExists,
            Decision::InfoHashAlreadyExistsAnotherTracker,
        ] {
            let restored = decision_from_str(decision_to_str(decision)).expect("decode");
            assert_eq!(restored, decision);
        }
    }

    #[test]
    fn unknown_decision_string_is_rejected() {
        assert!(decision_from_str("NOT_A_DECISION").is_err());
    }
}
