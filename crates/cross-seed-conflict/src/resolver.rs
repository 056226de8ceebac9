//! `resolveConflictRules`: decides whether an incumbent torrent should be
//! evicted in favor of a higher-priority candidate tracker, then drives
//! the eviction across every client holding it.

use std::sync::Arc;

use async_trait::async_trait;
use cross_seed_data::client_searchee::ClientSearcheeStore;
use cross_seed_data::conflict_rules::{ConflictRule, ConflictRulesStore};
use cross_seed_data::indexer::IndexerStore;
use cross_seed_model::normalize_trackers;
use tracing::{info, warn};

use crate::client::ClientDriver;
use crate::error::{ConflictError, ConflictResult};

/// The index of the first rule matching `tracker`, or `rules.len()` when no
/// rule matches (treated as the lowest possible priority).
fn priority_of(tracker: &str, rules: &[ConflictRule], all_indexer_trackers: &[String]) -> usize {
    rules
        .iter()
        .position(|rule| {
            if rule.all_indexers {
                all_indexer_trackers.iter().any(|known| known == tracker)
            } else {
                rule.trackers.iter().any(|candidate| candidate == tracker)
            }
        })
        .unwrap_or(rules.len())
}

/// `min` over a tracker set of each tracker's rule priority.
fn best_priority(trackers: &[String], rules: &[ConflictRule], all_indexer_trackers: &[String]) -> usize {
    trackers
        .iter()
        .map(|tracker| priority_of(tracker, rules, all_indexer_trackers))
        .min()
        .unwrap_or(rules.len())
}

/// Implements `resolveConflictRules(infoHash, candidateTrackers,
/// searcheeName) -> evicted`.
pub struct ConflictResolver {
    rules: ConflictRulesStore,
    indexers: IndexerStore,
    client_searchee: ClientSearcheeStore,
    client_driver: Arc<dyn ClientDriver>,
}

impl ConflictResolver {
    /// Construct a resolver over its repositories and client collaborator.
    #[must_use]
    pub const fn new(
        rules: ConflictRulesStore,
        indexers: IndexerStore,
        client_searchee: ClientSearcheeStore,
        client_driver: Arc<dyn ClientDriver>,
    ) -> Self {
        Self {
            rules,
            indexers,
            client_searchee,
            client_driver,
        }
    }

    /// Run the full algorithm: load rules, compute priorities, and evict
    /// the incumbent only on a strict priority win.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails. A partial eviction failure
    /// is reported as [`ConflictError::EvictionFailed`] rather than
    /// panicking; on that path all state is left untouched and the
    /// candidate is still considered excluded.
    pub async fn resolve(
        &self,
        info_hash: &str,
        candidate_trackers: &[String],
        searchee_name: &str,
    ) -> ConflictResult<bool> {
        let rules = self.rules.load().await?;
        let all_indexer_trackers = self.indexers.all_known_trackers().await?;
        let candidate_trackers = normalize_trackers(candidate_trackers);

        let incumbent_rows = self.client_searchee.for_hash(info_hash).await?;
        if incumbent_rows.is_empty() {
            return Ok(false);
        }

        let mut incumbent_trackers = Vec::new();
        for row in &incumbent_rows {
            incumbent_trackers.extend(row.trackers()?);
        }
        let incumbent_trackers = normalize_trackers(incumbent_trackers);

        let candidate_priority = best_priority(&candidate_trackers, &rules, &all_indexer_trackers);
        let incumbent_priority = best_priority(&incumbent_trackers, &rules, &all_indexer_trackers);

        if candidate_priority >= incumbent_priority {
            return Ok(false);
        }

        for row in &incumbent_rows {
            if let Err(source) = self
                .client_driver
                .request_removal(&row.client_host, info_hash)
                .await
            {
                warn!(
                    client_host = %row.client_host,
                    info_hash,
                    error = %source,
                    "eviction request failed, aborting conflict resolution"
                );
                return Err(ConflictError::EvictionFailed {
                    client_host: row.client_host.clone(),
                    info_hash: info_hash.to_string(),
                });
            }
        }

        for row in &incumbent_rows {
            let absent = self
                .client_driver
                .verify_absent(&row.client_host, info_hash)
                .await
                .unwrap_or(false);
            if !absent {
                warn!(
                    client_host = %row.client_host,
                    info_hash,
                    "client did not confirm torrent removal, aborting conflict resolution"
                );
                return Err(ConflictError::EvictionFailed {
                    client_host: row.client_host.clone(),
                    info_hash: info_hash.to_string(),
                });
            }
        }

        self.client_searchee.remove_all_for_hash(info_hash).await?;
        info!(info_hash, searchee_name, "evicted incumbent in favor of higher-priority candidate");
        Ok(true)
    }
}

#[async_trait]
impl cross_seed_decision::ConflictResolver for ConflictResolver {
    async fn resolve(
        &self,
        info_hash: &str,
        candidate_trackers: &[String],
        searchee_name: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.resolve(info_hash, candidate_trackers, searchee_name)
            .await
            .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<ConflictRule> {
        vec![
            ConflictRule::for_trackers(["private.example"]),
            ConflictRule::all_indexers(),
        ]
    }

    #[test]
    fn priority_of_named_rule_beats_all_indexers_catch_all() {
        let rules = rules();
        let indexers = vec!["private.example".to_string(), "public.example".to_string()];
        assert_eq!(priority_of("private.example", &rules, &indexers), 0);
        assert_eq!(priority_of("public.example", &rules, &indexers), 1);
    }

    #[test]
    fn unmatched_tracker_has_lowest_priority() {
        let rules = vec![ConflictRule::for_trackers(["private.example"])];
        assert_eq!(priority_of("unknown.example", &rules, &[]), rules.len());
    }

    #[test]
    fn best_priority_takes_the_minimum_across_trackers() {
        let rules = rules();
        let indexers = vec!["private.example".to_string()];
        let trackers = vec!["unknown.example".to_string(), "private.example".to_string()];
        assert_eq!(best_priority(&trackers, &rules, &indexers), 0);
    }
}
