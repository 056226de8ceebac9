//! Local seeded content that candidates are compared against.

use serde::{Deserialize, Serialize};

use crate::metafile::MetafileFile;

/// Provenance tag recording how a searchee entered the pipeline.
///
/// Affects snatch retry timing (`ANNOUNCE` gets a longer backoff, see
/// `cross-seed-decision`) and is otherwise informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearcheeLabel {
    /// Discovered via an operator-triggered bulk search.
    Search,
    /// Discovered via a tracker announce webhook.
    Announce,
    /// Discovered via RSS polling.
    Rss,
    /// Discovered as the target of an injection request.
    Inject,
    /// Discovered via a generic webhook.
    Webhook,
}

/// Local seeded content serving as the reference for cross-seed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Searchee {
    /// Canonical name used as (half of) the decision key.
    pub title: String,
    /// Info-hash, present when sourced from a torrent client.
    pub info_hash: Option<String>,
    /// Filesystem path, present when sourced from disk rather than a client.
    pub path: Option<String>,
    /// File listing.
    pub files: Vec<MetafileFile>,
    /// Total payload length in bytes.
    pub length: u64,
    /// Provenance tag.
    pub label: SearcheeLabel,
}

impl Searchee {
    /// Whether path-based comparison should be preferred over name-based
    /// comparison when matching files (searchees with a known info-hash or
    /// on-disk path carry directory structure worth trusting).
    #[must_use]
    pub const fn prefers_path_comparison(&self) -> bool {
        self.info_hash.is_some() || self.path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_path_comparison_when_info_hash_present() {
        let searchee = Searchee {
            title: "Example".to_string(),
            info_hash: Some("a".repeat(40)),
            path: None,
            files: vec![],
            length: 0,
            label: SearcheeLabel::Search,
        };
        assert!(searchee.prefers_path_comparison());
    }

    #[test]
    fn prefers_name_comparison_without_hash_or_path() {
        let searchee = Searchee {
            title: "Example".to_string(),
            info_hash: None,
            path: None,
            files: vec![],
            length: 0,
            label: SearcheeLabel::Rss,
        };
        assert!(!searchee.prefers_path_comparison());
    }
}
