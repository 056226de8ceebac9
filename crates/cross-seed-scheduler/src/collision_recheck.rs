//! `COLLISION_RECHECK` executor: drops stale cross-tracker collisions that
//! no client still holds, then re-searches the affected searchees.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use cross_seed_data::collision::CollisionStore;
use tracing::{info, warn};

use crate::bulk_search::BulkSearcher;
use crate::job::{JobExecutor, JobFailure};

/// Joins `collisions -> decision -> searchee`, left-joined with
/// `client_searchee` by info-hash (expressed in
/// [`CollisionStore::list_without_client_residency`] as a `NOT EXISTS`
/// filter), deletes rows no client still backs, and re-runs a bulk search
/// for the searchees affected with recency deduplication disabled.
pub struct CollisionRecheckExecutor {
    collisions: CollisionStore,
    bulk_searcher: Arc<dyn BulkSearcher>,
}

impl CollisionRecheckExecutor {
    /// Construct the executor over its repository and search collaborator.
    #[must_use]
    pub const fn new(collisions: CollisionStore, bulk_searcher: Arc<dyn BulkSearcher>) -> Self {
        Self { collisions, bulk_searcher }
    }
}

#[async_trait]
impl JobExecutor for CollisionRecheckExecutor {
    async fn execute(&self, _config_override: Option<&serde_json::Value>) -> Result<(), JobFailure> {
        let stale = self
            .collisions
            .list_without_client_residency()
            .await
            .map_err(|source| JobFailure::Transient(Box::new(source)))?;

        if stale.is_empty() {
            return Ok(());
        }

        let mut affected_names = BTreeSet::new();
        for row in &stale {
            affected_names.insert(row.searchee_name.clone());
            if let Err(source) = self.collisions.delete(row.decision_id).await {
                warn!(
                    decision_id = row.decision_id,
                    error = %source,
                    "failed to delete stale collision row"
                );
            }
        }

        let names: Vec<String> = affected_names.into_iter().collect();
        match self.bulk_searcher.bulk_search_by_names(&names, true).await {
            Ok(outcome) => {
                info!(
                    attempted = outcome.attempted,
                    requested = outcome.requested,
                    total_found = outcome.total_found,
                    "collision recheck re-search completed"
                );
                Ok(())
            }
            Err(source) => Err(JobFailure::Transient(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    #[test]
    fn dedupes_affected_names_across_rows() {
        let names = BTreeSet::from(["a".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(names.len(), 2);
    }
}
