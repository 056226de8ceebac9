//! Conflict-rule set repository: an ordered priority list consulted by the
//! conflict resolver, with the `allIndexers` catch-all placement rules
//! enforced at save time rather than left to callers.

use cross_seed_model::normalize_trackers;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{DataError, DataResult};
use crate::json_array;

/// A single conflict rule, ordered relative to its siblings by `priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRule {
    /// Whether this rule matches every indexer rather than a named tracker
    /// set.
    pub all_indexers: bool,
    /// Tracker set this rule matches; empty when `all_indexers` is set.
    pub trackers: Vec<String>,
}

impl ConflictRule {
    /// Construct a rule over a named tracker set.
    #[must_use]
    pub fn for_trackers<I, S>(trackers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            all_indexers: false,
            trackers: normalize_trackers(trackers),
        }
    }

    /// Construct the catch-all rule matching every indexer.
    #[must_use]
    pub const fn all_indexers() -> Self {
        Self {
            all_indexers: true,
            trackers: Vec::new(),
        }
    }
}

#[derive(FromRow)]
struct ConflictRuleRow {
    all_indexers: bool,
    trackers: serde_json::Value,
}

/// Repository for the `conflict_rules` table.
#[derive(Clone)]
pub struct ConflictRulesStore {
    pool: PgPool,
}

impl ConflictRulesStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the saved rule set, ordered by ascending priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or a stored tracker column fails to
    /// decode.
    pub async fn load(&self) -> DataResult<Vec<ConflictRule>> {
        let rows = sqlx::query_as::<_, ConflictRuleRow>(
            "SELECT all_indexers, trackers FROM conflict_rules ORDER BY priority ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "conflict_rules.load",
            source,
        })?;

        rows.into_iter()
            .map(|row| {
                let trackers = json_array::decode(&row.trackers, "conflict_rules.trackers")?;
                Ok(ConflictRule {
                    all_indexers: row.all_indexers,
                    trackers,
                })
            })
            .collect()
    }

    /// Validate and persist a new rule set, replacing whatever was saved
    /// before under a single transaction.
    ///
    /// An operator-supplied `allIndexers` rule is only valid as the final
    /// element of `rules`, and at most one may be present. When the
    /// supplied set is non-empty and does not already end in an
    /// `allIndexers` rule, one is appended automatically as the new
    /// lowest-priority rule.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidRuleSet`] if a non-`allIndexers` rule has
    /// no trackers, if more than one `allIndexers` rule is supplied, or if
    /// an `allIndexers` rule appears anywhere but last. Returns
    /// [`DataError::QueryFailed`] if persistence fails.
    pub async fn save(&self, rules: Vec<ConflictRule>) -> DataResult<()> {
        let finalized = Self::finalize(rules)?;

        let mut tx: Transaction<'_, Postgres> =
            self.pool.begin().await.map_err(|source| DataError::QueryFailed {
                operation: "conflict_rules.save.begin",
                source,
            })?;

        sqlx::query("DELETE FROM conflict_rules")
            .execute(&mut *tx)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "conflict_rules.save.delete",
                source,
            })?;

        for (index, rule) in finalized.iter().enumerate() {
            let priority = i32::try_from(index + 1).unwrap_or(i32::MAX);
            let trackers_json = json_array::encode(&rule.trackers);
            sqlx::query(
                "INSERT INTO conflict_rules (priority, all_indexers, trackers) VALUES ($1, $2, $3)",
            )
            .bind(priority)
            .bind(rule.all_indexers)
            .bind(&trackers_json)
            .execute(&mut *tx)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "conflict_rules.save.insert",
                source,
            })?;
        }

        tx.commit().await.map_err(|source| DataError::QueryFailed {
            operation: "conflict_rules.save.commit",
            source,
        })
    }

    /// Validate an operator-supplied rule set and append the implicit
    /// `allIndexers` catch-all where required, without touching storage.
    fn finalize(rules: Vec<ConflictRule>) -> DataResult<Vec<ConflictRule>> {
        if rules.is_empty() {
            return Ok(rules);
        }

        let all_indexers_count = rules.iter().filter(|rule| rule.all_indexers).count();
        if all_indexers_count > 1 {
            return Err(DataError::InvalidRuleSet {
                reason: "duplicate_all_indexers",
            });
        }

        for (index, rule) in rules.iter().enumerate() {
            if rule.all_indexers && index != rules.len() - 1 {
                return Err(DataError::InvalidRuleSet {
                    reason: "misplaced_all_indexers",
                });
            }
            if !rule.all_indexers && rule.trackers.is_empty() {
                return Err(DataError::InvalidRuleSet {
                    reason: "empty_rule",
                });
            }
        }

        let mut finalized = rules;
        let already_terminated = finalized.last().is_some_and(|rule| rule.all_indexers);
        if !already_terminated {
            finalized.push(ConflictRule::all_indexers());
        }
        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_appends_catch_all_when_missing() {
        let rules = vec![ConflictRule::for_trackers(["a.example"])];
        let finalized = ConflictRulesStore::finalize(rules).expect("finalize");
        assert_eq!(finalized.len(), 2);
        assert!(finalized[1].all_indexers);
    }

    #[test]
    fn finalize_leaves_already_terminated_set_alone() {
        let rules = vec![
            ConflictRule::for_trackers(["a.example"]),
            ConflictRule::all_indexers(),
        ];
        let finalized = ConflictRulesStore::finalize(rules).expect("finalize");
        assert_eq!(finalized.len(), 2);
    }

    #[test]
    fn finalize_leaves_empty_set_empty() {
        let finalized = ConflictRulesStore::finalize(Vec::new()).expect("finalize");
        assert!(finalized.is_empty());
    }

    #[test]
    fn finalize_rejects_misplaced_all_indexers() {
        let rules = vec![
            ConflictRule::all_indexers(),
            ConflictRule::for_trackers(["a.example"]),
        ];
        let err = ConflictRulesStore::finalize(rules).expect_err("should reject");
        assert!(matches!(
            err,
            DataError::InvalidRuleSet { reason: "misplaced_all_indexers" }
        ));
    }

    #[test]
    fn finalize_rejects_duplicate_all_indexers() {
        let rules = vec![ConflictRule::all_indexers(), ConflictRule::all_indexers()];
        let err = ConflictRulesStore::finalize(rules).expect_err("should reject");
        assert!(matches!(
            err,
            DataError::InvalidRuleSet { reason: "duplicate_all_indexers" }
        ));
    }

    #[test]
    fn finalize_rejects_empty_named_rule() {
        let rules = vec![ConflictRule::for_trackers(Vec::<String>::new())];
        let err = ConflictRulesStore::finalize(rules).expect_err("should reject");
        assert!(matches!(err, DataError::InvalidRuleSet { reason: "empty_rule" }));
    }

    #[test]
    fn finalize_accepts_single_all_indexers_rule() {
        let rules = vec![ConflictRule::all_indexers()];
        let finalized = ConflictRulesStore::finalize(rules).expect("finalize");
        assert_eq!(finalized.len(), 1);
    }
}
