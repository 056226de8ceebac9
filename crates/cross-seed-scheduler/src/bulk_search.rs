//! The bulk-search external collaborator and the RPC input-validation rules
//! for the two surfaces that front it (`bulkSearch`, `candidates`).

use async_trait::async_trait;

use crate::error::{SchedulerError, SchedulerResult};

/// Outcome of a bulk search request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSearchOutcome {
    /// Number of searchees attempted.
    pub attempted: u32,
    /// Number of searches actually issued (after rate/recency filtering).
    pub requested: u32,
    /// Total candidates found across all issued searches.
    pub total_found: u32,
}

/// External collaborator driving searches across configured indexers.
/// Adapters implement this against a concrete indexer client.
#[async_trait]
pub trait BulkSearcher: Send + Sync {
    /// Search for every name in `names`. `exclude_recent_search` forces the
    /// search to execute even if a recent identical search would otherwise
    /// be deduplicated, as the collision-recheck job requires.
    async fn bulk_search_by_names(
        &self,
        names: &[String],
        exclude_recent_search: bool,
    ) -> Result<BulkSearchOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

const BULK_SEARCH_MAX_NAMES: usize = 20;
const CANDIDATES_MAX_LIMIT: u32 = 200;

/// Validate a `searchees.bulkSearch` request: rejects an empty name list
/// and caps the batch at 20 names.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidBulkSearch`] if `names` is empty or
/// exceeds the cap.
pub fn validate_bulk_search_names(names: &[String]) -> SchedulerResult<()> {
    if names.is_empty() {
        return Err(SchedulerError::InvalidBulkSearch { reason: "empty_names" });
    }
    if names.len() > BULK_SEARCH_MAX_NAMES {
        return Err(SchedulerError::InvalidBulkSearch { reason: "too_many_names" });
    }
    Ok(())
}

/// Validate a `searchees.candidates` request: `limit` must be in `[1,
/// 200]`, `offset` must be non-negative (enforced by the `u32` type).
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidCandidatesQuery`] if `limit` is out of
/// range.
pub fn validate_candidates_query(limit: u32) -> SchedulerResult<()> {
    if limit == 0 || limit > CANDIDATES_MAX_LIMIT {
        return Err(SchedulerError::InvalidCandidatesQuery { reason: "limit_out_of_range" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_bulk_search() {
        let err = validate_bulk_search_names(&[]).expect_err("should reject");
        assert!(matches!(err, SchedulerError::InvalidBulkSearch { reason: "empty_names" }));
    }

    #[test]
    fn rejects_bulk_search_over_cap() {
        let names: Vec<String> = (0..21).map(|i| format!("name-{i}")).collect();
        let err = validate_bulk_search_names(&names).expect_err("should reject");
        assert!(matches!(err, SchedulerError::InvalidBulkSearch { reason: "too_many_names" }));
    }

    #[test]
    fn accepts_bulk_search_at_cap() {
        let names: Vec<String> = (0..20).map(|i| format!("name-{i}")).collect();
        validate_bulk_search_names(&names).expect("should accept");
    }

    #[test]
    fn rejects_zero_and_oversized_candidate_limits() {
        assert!(validate_candidates_query(0).is_err());
        assert!(validate_candidates_query(201).is_err());
        assert!(validate_candidates_query(1).is_ok());
        assert!(validate_candidates_query(200).is_ok());
    }
}
