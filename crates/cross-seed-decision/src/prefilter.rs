//! Pre-filter chain applied to a candidate's release name before any
//! metafile is fetched: release group, resolution, source, proper/repack,
//! fuzzy size, and download-link presence. Every name-based step "passes"
//! when either side lacks the information to compare, so the chain only
//! ever rejects on a positive disagreement.

use once_cell::sync::Lazy;
use regex::Regex;

use cross_seed_model::{Candidate, Searchee};

static RELEASE_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([A-Za-z0-9][A-Za-z0-9.]*)$").expect("valid regex"));
static ANIME_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]").expect("valid regex"));
static RESOLUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(480p|576p|720p|1080p|1080i|2160p|4320p)\b").expect("valid regex"));
static SOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bluray|blu-ray|remux|web-dl|webrip|web|hdtv|dvdrip|bdrip|bdremux)\b")
        .expect("valid regex")
});
static PROPER_REPACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(proper|repack)\b").expect("valid regex"));

/// Extract the trailing release-group token (`-GROUP` suffix), falling back
/// to a leading bracketed anime group tag (`[Group] Title`) when no
/// `-GROUP` token is present.
#[must_use]
pub fn extract_release_group(name: &str) -> Option<String> {
    let trimmed = name.trim_end_matches(['.']);
    if let Some(caps) = RELEASE_GROUP_RE.captures(trimmed) {
        let candidate = caps.get(1)?.as_str();
        if candidate.chars().any(char::is_alphabetic) {
            return Some(candidate.to_lowercase());
        }
    }
    ANIME_GROUP_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Extract a strict resolution token (e.g. `1080p`), normalized to
/// lowercase.
#[must_use]
pub fn extract_resolution(name: &str) -> Option<String> {
    RESOLUTION_RE
        .find(name)
        .map(|m| m.as_str().to_lowercase())
}

/// Extract a release source token (e.g. `bluray`, `web-dl`), normalized to
/// lowercase.
#[must_use]
pub fn extract_source(name: &str) -> Option<String> {
    SOURCE_RE.find(name).map(|m| m.as_str().to_lowercase())
}

/// Whether the name carries a `PROPER` or `REPACK` tag.
#[must_use]
pub fn is_proper_or_repack(name: &str) -> bool {
    PROPER_REPACK_RE.is_match(name)
}

/// A name-based predicate that only fails on a positive disagreement: if
/// either extractor returns `None`, the step passes.
fn agrees_or_unknown<F>(left: &str, right: &str, extract: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match (extract(left), extract(right)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Reasons the pre-filter chain can reject a candidate, naming which step
/// produced the disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefilterRejection {
    /// Candidate and searchee release groups disagree.
    ReleaseGroup,
    /// Candidate and searchee resolutions disagree.
    Resolution,
    /// Candidate and searchee sources disagree.
    Source,
    /// Exactly one side carries a proper/repack tag.
    ProperRepack,
    /// Candidate's advertised size is outside the fuzzy tolerance.
    FuzzySize,
    /// Candidate has no usable download link.
    NoDownloadLink,
}

/// Run the full pre-filter chain against a candidate form (a release whose
/// metafile has not yet been fetched).
///
/// # Errors
///
/// Returns the first [`PrefilterRejection`] encountered, in spec order:
/// release group, resolution, source, proper/repack, fuzzy size,
/// download-link presence.
pub fn check_candidate(
    candidate: &Candidate,
    searchee: &Searchee,
    fuzzy_size_factor: f64,
) -> Result<(), PrefilterRejection> {
    if !agrees_or_unknown(&candidate.name, &searchee.title, extract_release_group) {
        return Err(PrefilterRejection::ReleaseGroup);
    }
    if !agrees_or_unknown(&candidate.name, &searchee.title, extract_resolution) {
        return Err(PrefilterRejection::Resolution);
    }
    if !agrees_or_unknown(&candidate.name, &searchee.title, extract_source) {
        return Err(PrefilterRejection::Source);
    }
    if is_proper_or_repack(&candidate.name) != is_proper_or_repack(&searchee.title) {
        return Err(PrefilterRejection::ProperRepack);
    }
    if let Some(size) = candidate.size {
        if searchee.length > 0 && !fuzzy_size_ok(size, searchee.length, fuzzy_size_factor) {
            return Err(PrefilterRejection::FuzzySize);
        }
    }
    if !candidate.has_download_link() {
        return Err(PrefilterRejection::NoDownloadLink);
    }
    Ok(())
}

/// `|candidate_size - searchee_length| / searchee_length <= factor`.
#[must_use]
pub fn fuzzy_size_ok(candidate_size: u64, searchee_length: u64, factor: f64) -> bool {
    if searchee_length == 0 {
        return candidate_size == 0;
    }
    let diff = candidate_size.abs_diff(searchee_length);
    (diff as f64) / (searchee_length as f64) <= factor
}

/// Case-insensitive substring match against every entry in `block_list`.
#[must_use]
pub fn is_blocked(text: &str, block_list: &[String]) -> bool {
    let lower = text.to_lowercase();
    block_list
        .iter()
        .any(|blocked| !blocked.is_empty() && lower.contains(&blocked.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_group_extracted_from_trailing_token() {
        assert_eq!(
            extract_release_group("Some.Movie.2020.1080p.BluRay-GROUP"),
            Some("group".to_string())
        );
    }

    #[test]
    fn release_group_falls_back_to_anime_bracket() {
        assert_eq!(
            extract_release_group("[SubsPlease] Some Show - 01"),
            Some("subsplease".to_string())
        );
    }

    #[test]
    fn release_group_absent_is_none() {
        assert_eq!(extract_release_group("Some Movie 2020"), None);
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(extract_resolution("Movie.1080P.WEB-DL"), Some("1080p".to_string()));
    }

    #[test]
    fn fuzzy_size_ok_within_tolerance() {
        assert!(fuzzy_size_ok(1020, 1000, 0.02));
        assert!(!fuzzy_size_ok(1021, 1000, 0.02));
    }

    #[test]
    fn fuzzy_size_ok_zero_length_requires_zero_size() {
        assert!(fuzzy_size_ok(0, 0, 0.02));
        assert!(!fuzzy_size_ok(1, 0, 0.02));
    }

    #[test]
    fn block_list_matches_case_insensitively() {
        assert!(is_blocked("Some CAM Release", &["cam".to_string()]));
        assert!(!is_blocked("Some Release", &["cam".to_string()]));
    }

    #[test]
    fn proper_repack_disagreement_is_rejected() {
        let candidate = Candidate {
            name: "Some.Movie.2020.PROPER.1080p-GROUP".to_string(),
            guid: "guid-1".to_string(),
            link: Some("https://example.invalid/1".to_string()),
            tracker: "tracker-a".to_string(),
            indexer_id: 1,
            size: None,
        };
        let searchee = Searchee {
            title: "Some.Movie.2020.1080p-GROUP".to_string(),
            info_hash: None,
            path: None,
            files: Vec::new(),
            length: 0,
            label: cross_seed_model::SearcheeLabel::Search,
        };
        assert_eq!(
            check_candidate(&candidate, &searchee, 0.02),
            Err(PrefilterRejection::ProperRepack)
        );
    }

    #[test]
    fn missing_download_link_is_rejected_last() {
        let candidate = Candidate {
            name: "Some.Movie.2020.1080p-GROUP".to_string(),
            guid: "guid-1".to_string(),
            link: None,
            tracker: "tracker-a".to_string(),
            indexer_id: 1,
            size: None,
        };
        let searchee = Searchee {
            title: "Some.Movie.2020.1080p-GROUP".to_string(),
            info_hash: None,
            path: None,
            files: Vec::new(),
            length: 0,
            label: cross_seed_model::SearcheeLabel::Search,
        };
        assert_eq!(
            check_candidate(&candidate, &searchee, 0.02),
            Err(PrefilterRejection::NoDownloadLink)
        );
    }
}
