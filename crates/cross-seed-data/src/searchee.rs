//! Searchee identity repository: maps a searchee's canonical title to the
//! surrogate key the decision table keys against.

use sqlx::{FromRow, PgPool};

use crate::error::{DataError, DataResult};

/// A persisted searchee identity row.
#[derive(Debug, Clone, FromRow)]
pub struct SearcheeRow {
    /// Primary key, referenced by `decision.searchee_id`.
    pub id: i64,
    /// Canonical title used as the decision key.
    pub name: String,
}

/// Repository for the `searchee` table.
#[derive(Clone)]
pub struct SearcheeStore {
    pool: PgPool,
}

impl SearcheeStore {
    /// Construct a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the identity row for `name`, creating it if it does not yet
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_or_create(&self, name: &str) -> DataResult<SearcheeRow> {
        sqlx::query_as::<_, SearcheeRow>(
            "INSERT INTO searchee (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = excluded.name
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| DataError::QueryFailed {
            operation: "searchee.get_or_create",
            source,
        })
    }

    /// Fetch the identity row for `name` without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_name(&self, name: &str) -> DataResult<Option<SearcheeRow>> {
        sqlx::query_as::<_, SearcheeRow>("SELECT id, name FROM searchee WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "searchee.find_by_name",
                source,
            })
    }
}
