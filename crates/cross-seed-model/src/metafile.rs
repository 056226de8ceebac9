//! Parsed-torrent value type.

use serde::{Deserialize, Serialize};

/// Tri-state privacy flag recorded in a torrent's info dictionary.
///
/// Torrent parsing (bencode I/O) is an external collaborator; this crate only
/// models the outcome. `Unknown` covers metafiles synthesized without a
/// `private` key, which must not be treated as `false` by the collision
/// recorder's private-only policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    /// `private=1`: excluded from DHT/PEX.
    Private,
    /// `private` absent or `0`.
    Public,
    /// Privacy could not be determined (e.g. a stub metafile used in tests).
    Unknown,
}

impl Privacy {
    /// Whether the torrent is known to be private.
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

/// A single file entry within a torrent's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafileFile {
    /// Full relative path within the torrent payload, including the file name.
    pub path: String,
    /// File name only (final path component).
    pub name: String,
    /// File length in bytes.
    pub length: u64,
}

impl MetafileFile {
    /// Construct a file entry, deriving `name` from the trailing path component.
    #[must_use]
    pub fn new(path: impl Into<String>, length: u64) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .next()
            .map_or_else(|| path.clone(), ToOwned::to_owned);
        Self { path, name, length }
    }
}

/// An immutable, fully parsed torrent.
///
/// Torrent-file parsing and bencode I/O are out of scope for this crate;
/// callers (the snatcher, the torrent cache) hand the decision engine an
/// already-parsed `Metafile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafile {
    /// Lowercase 40-character hex SHA-1 info-hash.
    pub info_hash: String,
    /// Total payload length in bytes, summed across all files.
    pub length: u64,
    /// Piece length in bytes.
    pub piece_length: u64,
    /// Display name (usually the top-level directory or single file name).
    pub name: String,
    /// Ordered file list.
    pub files: Vec<MetafileFile>,
    /// Announce URLs. Order matters for tiering but not for equality checks.
    pub trackers: Vec<String>,
    /// Private-flag tri-state.
    pub private: Privacy,
}

impl Metafile {
    /// Number of pieces required to cover the payload, rounding up.
    ///
    /// # Panics
    ///
    /// Panics if `piece_length` is zero; a parsed torrent always has a
    /// positive piece length.
    #[must_use]
    pub fn piece_count(&self) -> u64 {
        assert!(self.piece_length > 0, "metafile has zero piece length");
        self.length.div_ceil(self.piece_length)
    }

    /// Normalized (trimmed, lowercased, sorted, deduplicated) tracker set.
    #[must_use]
    pub fn normalized_trackers(&self) -> Vec<String> {
        crate::tracker::normalize_trackers(&self.trackers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metafile {
        Metafile {
            info_hash: "a".repeat(40),
            length: 1_500,
            piece_length: 500,
            name: "Sample.Release".to_string(),
            files: vec![MetafileFile::new("Sample.Release/a.mkv", 1_500)],
            trackers: vec!["Tracker.Example".to_string()],
            private: Privacy::Private,
        }
    }

    #[test]
    fn piece_count_rounds_up() {
        let mut meta = sample();
        meta.length = 1_501;
        assert_eq!(meta.piece_count(), 4);
    }

    #[test]
    fn file_new_derives_name_from_path() {
        let file = MetafileFile::new("a/b/c.mkv", 10);
        assert_eq!(file.name, "c.mkv");
    }

    #[test]
    fn privacy_is_private_only_for_private_variant() {
        assert!(Privacy::Private.is_private());
        assert!(!Privacy::Public.is_private());
        assert!(!Privacy::Unknown.is_private());
    }

    #[test]
    fn normalized_trackers_lowercases_and_sorts() {
        let meta = sample();
        assert_eq!(meta.normalized_trackers(), vec!["tracker.example"]);
    }
}
