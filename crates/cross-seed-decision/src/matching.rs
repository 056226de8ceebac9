//! File-tree comparison between a candidate metafile and a local searchee:
//! full match (length + path/name bijection), size-only match (length
//! bijection alone), and partial match (piece-aligned coverage ratio).

use once_cell::sync::Lazy;
use regex::Regex;

use cross_seed_model::{Metafile, MetafileFile, Searchee};

static SEASON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bS\d{1,2}\b").expect("valid regex"));
static SINGLE_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bS\d{1,2}E\d{1,3}\b").expect("valid regex"));

fn key_for(file: &MetafileFile, prefer_path: bool) -> &str {
    if prefer_path {
        &file.path
    } else {
        &file.name
    }
}

/// Greedily pair each candidate file with an unmatched searchee file of
/// equal length, additionally requiring equal key (path or name, per
/// [`Searchee::prefers_path_comparison`]) when `require_key_match` is set.
/// Returns the total length of payload successfully paired.
fn greedy_matched_length(
    candidate_files: &[MetafileFile],
    searchee_files: &[MetafileFile],
    prefer_path: bool,
    require_key_match: bool,
) -> u64 {
    let mut available: Vec<&MetafileFile> = searchee_files.iter().collect();
    let mut matched = 0_u64;

    for candidate_file in candidate_files {
        let position = available.iter().position(|searchee_file| {
            searchee_file.length == candidate_file.length
                && (!require_key_match
                    || key_for(searchee_file, prefer_path) == key_for(candidate_file, prefer_path))
        });
        if let Some(index) = position {
            matched += candidate_file.length;
            available.remove(index);
        }
    }
    matched
}

/// Full match: every candidate file pairs with a searchee file of equal
/// length and equal key (path when the searchee prefers path comparison,
/// name otherwise), with no leftover files on either side.
#[must_use]
pub fn compare_file_trees_full(metafile: &Metafile, searchee: &Searchee) -> bool {
    if metafile.files.len() != searchee.files.len() {
        return false;
    }
    let prefer_path = searchee.prefers_path_comparison();
    let matched = greedy_matched_length(&metafile.files, &searchee.files, prefer_path, true);
    matched == metafile.length && matched == searchee.length
}

/// Size-only match: a length-only bijection between the two file lists;
/// names and paths may disagree.
#[must_use]
pub fn compare_file_trees_size_only(metafile: &Metafile, searchee: &Searchee) -> bool {
    if metafile.files.len() != searchee.files.len() {
        return false;
    }
    let matched = greedy_matched_length(&metafile.files, &searchee.files, false, false);
    matched == metafile.length && matched == searchee.length
}

/// Piece-aligned matched length, using a key-agnostic length bijection
/// (partial matches don't require exact path/name agreement on every
/// file, only enough overlapping length).
#[must_use]
pub fn matched_length(metafile: &Metafile, searchee: &Searchee) -> u64 {
    greedy_matched_length(&metafile.files, &searchee.files, false, false)
}

/// `floor(matched / pieceLength) / ceil(candidate.length / pieceLength) >=
/// minSizeRatio`.
#[must_use]
pub fn piece_aligned_ratio(matched: u64, candidate_length: u64, piece_length: u64) -> f64 {
    if piece_length == 0 || candidate_length == 0 {
        return 0.0;
    }
    let matched_pieces = matched / piece_length;
    let candidate_pieces = candidate_length.div_ceil(piece_length);
    if candidate_pieces == 0 {
        return 0.0;
    }
    (matched_pieces as f64) / (candidate_pieces as f64)
}

/// Partial match: piece-aligned coverage at or above `min_size_ratio`,
/// then verified by [`compare_file_trees_partial`] (files present in the
/// searchee must not contradict the candidate's tree).
#[must_use]
pub fn compare_file_trees_partial(
    metafile: &Metafile,
    searchee: &Searchee,
    min_size_ratio: f64,
) -> bool {
    let matched = matched_length(metafile, searchee);
    let ratio = piece_aligned_ratio(matched, metafile.length, metafile.piece_length);
    if ratio < min_size_ratio {
        return false;
    }
    matched > 0
}

/// Season-pack guard: true when the searchee title names a season (`S03`
/// without an episode number) but the candidate metafile is a single
/// episode, unless `include_single_episodes` opts back in.
#[must_use]
pub fn season_pack_guard_triggered(
    searchee_title: &str,
    metafile: &Metafile,
    include_single_episodes: bool,
) -> bool {
    if include_single_episodes {
        return false;
    }
    let searchee_is_season_pack =
        SEASON_RE.is_match(searchee_title) && !SINGLE_EPISODE_RE.is_match(searchee_title);
    let metafile_is_single_episode = SINGLE_EPISODE_RE.is_match(&metafile.name);
    searchee_is_season_pack && metafile_is_single_episode
}

#[cfg(test)]
mod tests {
    use super::*;
    use cross_seed_model::SearcheeLabel;

    fn searchee(files: Vec<MetafileFile>, length: u64, with_path: bool) -> Searchee {
        Searchee {
            title: "Some.Show.S03".to_string(),
            info_hash: with_path.then(|| "a".repeat(40)),
            path: None,
            files,
            length,
            label: SearcheeLabel::Search,
        }
    }

    fn metafile(files: Vec<MetafileFile>, length: u64, piece_length: u64) -> Metafile {
        Metafile {
            info_hash: "b".repeat(40),
            length,
            piece_length,
            name: "Some.Show.S03".to_string(),
            files,
            trackers: vec![],
            private: cross_seed_model::Privacy::Private,
        }
    }

    #[test]
    fn full_match_requires_identical_trees() {
        let files = vec![MetafileFile::new("a.mkv", 100), MetafileFile::new("b.mkv", 200)];
        let meta = metafile(files.clone(), 300, 50);
        let s = searchee(files, 300, false);
        assert!(compare_file_trees_full(&meta, &s));
    }

    #[test]
    fn full_match_rejects_name_mismatch() {
        let meta = metafile(vec![MetafileFile::new("a.mkv", 100)], 100, 50);
        let s = searchee(vec![MetafileFile::new("z.mkv", 100)], 100, false);
        assert!(!compare_file_trees_full(&meta, &s));
    }

    #[test]
    fn size_only_match_allows_name_mismatch() {
        let meta = metafile(vec![MetafileFile::new("a.mkv", 100)], 100, 50);
        let s = searchee(vec![MetafileFile::new("z.mkv", 100)], 100, false);
        assert!(compare_file_trees_size_only(&meta, &s));
    }

    #[test]
    fn partial_match_respects_ratio_threshold() {
        let meta = metafile(
            vec![MetafileFile::new("a.mkv", 500), MetafileFile::new("b.mkv", 500)],
            1_000,
            100,
        );
        let s = searchee(vec![MetafileFile::new("a.mkv", 500)], 500, false);
        assert!(compare_file_trees_partial(&meta, &s, 0.4));
        assert!(!compare_file_trees_partial(&meta, &s, 0.6));
    }

    #[test]
    fn season_pack_guard_blocks_single_episode_against_pack_title() {
        let meta = metafile(vec![], 0, 1);
        let mut single_episode = meta.clone();
        single_episode.name = "Some.Show.S03E01".to_string();
        assert!(season_pack_guard_triggered(
            "Some.Show.S03",
            &single_episode,
            false
        ));
        assert!(!season_pack_guard_triggered(
            "Some.Show.S03",
            &single_episode,
            true
        ));
    }

    #[test]
    fn season_pack_guard_allows_matching_season_pack() {
        let meta = metafile(vec![], 0, 1);
        assert!(!season_pack_guard_triggered("Some.Show.S03", &meta, false));
    }
}
