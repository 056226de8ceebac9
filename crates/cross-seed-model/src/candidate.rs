//! Indexer search hits under evaluation by the decision engine.

use serde::{Deserialize, Serialize};

/// A search hit returned by an indexer, prior to being snatched and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Release name as reported by the indexer.
    pub name: String,
    /// Indexer-unique identifier for this search result.
    pub guid: String,
    /// Download URL.
    pub link: Option<String>,
    /// Announce host for this indexer.
    pub tracker: String,
    /// Identifier of the indexer that produced this result.
    pub indexer_id: i64,
    /// Advisory size in bytes; indexers may misreport this.
    pub size: Option<u64>,
}

impl Candidate {
    /// Whether the candidate has a usable download link.
    #[must_use]
    pub fn has_download_link(&self) -> bool {
        self.link.as_deref().is_some_and(|link| !link.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(link: Option<&str>) -> Candidate {
        Candidate {
            name: "Example.Release-GRP".to_string(),
            guid: "guid-1".to_string(),
            link: link.map(ToOwned::to_owned),
            tracker: "tracker.example".to_string(),
            indexer_id: 1,
            size: Some(1_000),
        }
    }

    #[test]
    fn has_download_link_rejects_missing_and_empty() {
        assert!(!sample(None).has_download_link());
        assert!(!sample(Some("")).has_download_link());
        assert!(sample(Some("https://example/download")).has_download_link());
    }
}
