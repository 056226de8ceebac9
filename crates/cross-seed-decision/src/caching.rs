//! Caching wrapper around [`DecisionEngine::assess`]: looks up the prior
//! decision for `(searchee, guid)` first, short-circuits excluded hashes
//! into a collision-only refresh, and otherwise persists the fresh
//! assessment under a transaction.

use std::sync::Arc;

use cross_seed_data::collision::CollisionStore;
use cross_seed_data::decision::DecisionStore;
use cross_seed_data::indexer::IndexerStore;
use cross_seed_data::searchee::SearcheeStore;
use cross_seed_model::ResultAssessment;
use tracing::info;

use crate::engine::{CandidateOrMetafile, ConflictResolver, DecisionEngine};
use crate::error::DecisionResult;
use crate::options::AssessmentOptions;

/// Persists decision engine assessments and implements the excluded-hash
/// short-circuit path.
pub struct CachingAssessor {
    engine: DecisionEngine,
    decisions: DecisionStore,
    collisions: CollisionStore,
    indexers: IndexerStore,
    searchees: SearcheeStore,
    conflict_resolver: Arc<dyn ConflictResolver>,
}

impl CachingAssessor {
    /// Construct a caching wrapper over `engine` and the persistence
    /// repositories it writes through.
    #[must_use]
    pub fn new(
        engine: DecisionEngine,
        decisions: DecisionStore,
        collisions: CollisionStore,
        indexers: IndexerStore,
        searchees: SearcheeStore,
        conflict_resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            engine,
            decisions,
            collisions,
            indexers,
            searchees,
            conflict_resolver,
        }
    }

    /// Assess `input` against the searchee named `searchee_name`, keyed by
    /// `(searchee_name, guid)` against the decision table.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or the underlying engine fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn assess_candidate_caching(
        &self,
        input: CandidateOrMetafile,
        searchee_name: &str,
        searchee: &cross_seed_model::Searchee,
        guid: &str,
        excluded_info_hashes: &mut Vec<String>,
        block_list: &[String],
        options: &AssessmentOptions,
        indexer_id: i64,
    ) -> DecisionResult<ResultAssessment> {
        let searchee_row = self.searchees.get_or_create(searchee_name).await?;
        let existing = self.decisions.get(searchee_row.id, guid).await?;

        if let Some(existing) = &existing
            && let Some(info_hash) = &existing.info_hash
            && excluded_info_hashes.iter().any(|hash| hash == info_hash)
        {
            self.decisions.touch_last_seen(existing.id).await?;
            self.collisions.refresh(existing.id).await?;

            let candidate_trackers = self
                .collisions
                .get(existing.id)
                .await?
                .map(|row| row.candidate_trackers())
                .transpose()?
                .unwrap_or_default();

            let evicted = self
                .conflict_resolver
                .resolve(info_hash, &candidate_trackers, searchee_name)
                .await
                .unwrap_or(false);
            if evicted {
                excluded_info_hashes.retain(|hash| hash != info_hash);
                info!(info_hash = %info_hash, "excluded hash evicted during cached refresh");
            }

            let decision = existing.decision()?;
            return Ok(ResultAssessment::rejected(decision));
        }

        let fuzzy_size_factor = options.fuzzy_size_factor;
        let assessment = self
            .engine
            .assess(
                input,
                searchee,
                excluded_info_hashes,
                block_list,
                options,
                indexer_id,
            )
            .await?;

        if assessment.meta_cached {
            let info_hash = assessment
                .metafile
                .as_ref()
                .map(|metafile| metafile.info_hash.clone());

            let row = self
                .decisions
                .upsert(
                    searchee_row.id,
                    guid,
                    info_hash.as_deref(),
                    assessment.decision,
                    fuzzy_size_factor,
                )
                .await?;

            if let Some(metafile) = &assessment.metafile {
                self.indexers
                    .merge_trackers(indexer_id, &metafile.normalized_trackers())
                    .await?;
            }

            let is_private = assessment
                .metafile
                .as_ref()
                .is_some_and(|metafile| metafile.private.is_private());

            if assessment.decision.is_cross_tracker_collision() && is_private {
                if let (Some(mismatch), Some(info_hash)) =
                    (&assessment.tracker_mismatch, &info_hash)
                {
                    self.collisions
                        .record(
                            row.id,
                            info_hash,
                            searchee_name,
                            &mismatch.candidate_trackers,
                            &mismatch.known_trackers,
                        )
                        .await?;
                }
            } else {
                self.collisions.delete(row.id).await?;
            }
        }

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use cross_seed_model::Decision;

    #[test]
    fn cross_tracker_collision_is_the_only_private_gated_variant() {
        assert!(Decision::InfoHashAlreadyExistsAnotherTracker.is_cross_tracker_collision());
        assert!(!Decision::SameInfoHash.is_cross_tracker_collision());
    }
}
