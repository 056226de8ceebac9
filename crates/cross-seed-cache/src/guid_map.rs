//! In-memory `(guid, link) -> info_hash` correlation map.
//!
//! Repeated indexer hits for a release already snatched under a different
//! guid (the indexer re-announced it) should reuse the cached metafile
//! rather than re-snatching. This map is the process-scoped singleton that
//! makes that lookup cheap; it is rebuilt from the decision table on
//! startup rather than persisted itself.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Composite key identifying one indexer search hit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuidLinkKey {
    /// Indexer-unique identifier for the search result.
    pub guid: String,
    /// Download URL for the search result.
    pub link: String,
}

/// Process-scoped, mutex-guarded `(guid, link) -> info_hash` map.
#[derive(Debug, Default)]
pub struct GuidInfoHashMap {
    inner: RwLock<HashMap<GuidLinkKey, String>>,
}

impl GuidInfoHashMap {
    /// Construct an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously recorded info-hash for `(guid, link)`.
    pub async fn get(&self, guid: &str, link: &str) -> Option<String> {
        let key = GuidLinkKey {
            guid: guid.to_string(),
            link: link.to_string(),
        };
        self.inner.read().await.get(&key).cloned()
    }

    /// Record the info-hash a `(guid, link)` pair resolved to.
    pub async fn insert(&self, guid: &str, link: &str, info_hash: &str) {
        let key = GuidLinkKey {
            guid: guid.to_string(),
            link: link.to_string(),
        };
        self.inner
            .write()
            .await
            .insert(key, info_hash.to_string());
    }

    /// Replace the entire map, used to rebuild from the decision table on
    /// startup.
    pub async fn rebuild<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let mut map = HashMap::new();
        for (guid, link, info_hash) in entries {
            map.insert(GuidLinkKey { guid, link }, info_hash);
        }
        *self.inner.write().await = map;
    }

    /// Number of entries currently tracked.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the map is currently empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let map = GuidInfoHashMap::new();
        map.insert("guid-1", "https://example/1", &"a".repeat(40))
            .await;
        assert_eq!(
            map.get("guid-1", "https://example/1").await,
            Some("a".repeat(40))
        );
        assert_eq!(map.get("guid-1", "https://example/2").await, None);
    }

    #[tokio::test]
    async fn rebuild_replaces_existing_entries() {
        let map = GuidInfoHashMap::new();
        map.insert("stale", "link", &"a".repeat(40)).await;

        map.rebuild([("fresh".to_string(), "link".to_string(), "b".repeat(40))])
            .await;

        assert_eq!(map.get("stale", "link").await, None);
        assert_eq!(map.get("fresh", "link").await, Some("b".repeat(40)));
        assert_eq!(map.len().await, 1);
    }

    #[tokio::test]
    async fn new_map_is_empty() {
        let map = GuidInfoHashMap::new();
        assert!(map.is_empty().await);
    }
}
