//! Builders for the domain types exercised across the decision, conflict,
//! and scheduler crates, so unit tests don't hand-roll struct literals with
//! every field pinned.

use cross_seed_model::metafile::{Metafile, MetafileFile, Privacy};
use cross_seed_model::searchee::{Searchee, SearcheeLabel};
use cross_seed_model::Candidate;

/// A plausible 40-character hex info-hash derived from `seed`, for tests
/// that need a stable but distinct hash per fixture.
#[must_use]
pub fn info_hash(seed: u8) -> String {
    format!("{seed:02x}").repeat(20)
}

/// A minimal single-file private metafile.
#[must_use]
pub fn metafile(name: &str, length: u64) -> Metafile {
    Metafile {
        info_hash: info_hash(0xab),
        length,
        piece_length: 32_768,
        name: name.to_string(),
        files: vec![MetafileFile::new(format!("{name}/{name}.mkv"), length)],
        trackers: vec!["tracker.example".to_string()],
        private: Privacy::Private,
    }
}

/// A searchee matching [`metafile`]'s default shape, sourced from disk.
#[must_use]
pub fn searchee(title: &str, length: u64) -> Searchee {
    Searchee {
        title: title.to_string(),
        info_hash: None,
        path: Some(format!("/downloads/{title}")),
        files: vec![MetafileFile::new(format!("{title}/{title}.mkv"), length)],
        length,
        label: SearcheeLabel::Search,
    }
}

/// A candidate with a usable download link pointing at `tracker`.
#[must_use]
pub fn candidate(name: &str, guid: &str, tracker: &str, indexer_id: i64, size: u64) -> Candidate {
    Candidate {
        name: name.to_string(),
        guid: guid.to_string(),
        link: Some(format!("https://{tracker}/download/{guid}")),
        tracker: tracker.to_string(),
        indexer_id,
        size: Some(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_hash_is_forty_hex_characters() {
        let hash = info_hash(0xcd);
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn candidate_has_a_download_link() {
        assert!(candidate("Example-GRP", "guid-1", "tracker.example", 1, 1_000).has_download_link());
    }
}
