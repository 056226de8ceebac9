//! The exhaustive decision taxonomy and the assessment result type.

use serde::{Deserialize, Serialize};

use crate::metafile::Metafile;

/// The exhaustive set of outcomes the decision engine can produce for a
/// `(searchee, candidate)` pair. Every code path through `assess` terminates
/// in exactly one of these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Every candidate file is matched by a searchee file with equal length
    /// and equal path or name.
    Match,
    /// Bijection on length only; names may differ. Non-strict match modes only.
    MatchSizeOnly,
    /// Aligned-piece coverage meets the searchee's minimum size ratio. Partial
    /// match mode only.
    MatchPartial,
    /// Lengths do not reconcile under full-tree comparison.
    SizeMismatch,
    /// Lengths do not reconcile under partial comparison.
    PartialSizeMismatch,
    /// File trees disagree in a way no match mode can reconcile (including
    /// the season-pack guard).
    FileTreeMismatch,
    /// Candidate's extracted release group differs from the searchee's.
    ReleaseGroupMismatch,
    /// Candidate's resolution token differs from the searchee's.
    ResolutionMismatch,
    /// Candidate's source token differs from the searchee's.
    SourceMismatch,
    /// Candidate's proper/repack status differs from the searchee's.
    ProperRepackMismatch,
    /// Candidate's advertised size falls outside the fuzzy size tolerance.
    FuzzySizeMismatch,
    /// Candidate has no usable download link.
    NoDownloadLink,
    /// Candidate name or metafile name matched an operator block-list entry.
    BlockedRelease,
    /// Candidate resolved to a magnet link rather than a `.torrent` file.
    MagnetLink,
    /// Indexer rate-limited the snatch attempt.
    RateLimited,
    /// Snatch failed for a reason other than magnet/rate-limit.
    DownloadFailed,
    /// Candidate's info-hash equals the searchee's own, and tracker sets match.
    SameInfoHash,
    /// Candidate's info-hash already exists locally under the same tracker set.
    InfoHashAlreadyExists,
    /// Candidate's info-hash already exists locally under a different tracker set.
    InfoHashAlreadyExistsAnotherTracker,
}

impl Decision {
    /// Whether this decision represents a safe injection target.
    #[must_use]
    pub const fn is_actionable_match(self) -> bool {
        matches!(self, Self::Match | Self::MatchSizeOnly | Self::MatchPartial)
    }

    /// Whether this is the cross-tracker collision variant that the
    /// collision recorder tracks.
    #[must_use]
    pub const fn is_cross_tracker_collision(self) -> bool {
        matches!(self, Self::InfoHashAlreadyExistsAnotherTracker)
    }
}

/// Normalized tracker sets compared during an identity check, retained so
/// callers can tell which trackers actually differed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerMismatch {
    /// Normalized trackers carried by the candidate metafile.
    pub candidate_trackers: Vec<String>,
    /// Normalized trackers already known locally for this info-hash.
    pub known_trackers: Vec<String>,
}

/// Result of assessing one `(searchee, candidate)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAssessment {
    /// The terminal decision.
    pub decision: Decision,
    /// The parsed metafile, present whenever a snatch succeeded (candidate
    /// form) or was supplied directly (metafile form).
    pub metafile: Option<Metafile>,
    /// Whether the metafile was written to the content-addressed cache
    /// during this assessment.
    pub meta_cached: bool,
    /// Present for the identity-collision decisions; `None` otherwise.
    pub tracker_mismatch: Option<TrackerMismatch>,
}

impl ResultAssessment {
    /// Construct a terminal assessment with no metafile (pre-filter
    /// rejections and protocol failures).
    #[must_use]
    pub const fn rejected(decision: Decision) -> Self {
        Self {
            decision,
            metafile: None,
            meta_cached: false,
            tracker_mismatch: None,
        }
    }

    /// Construct an assessment carrying a resolved metafile.
    #[must_use]
    pub const fn with_metafile(decision: Decision, metafile: Metafile, meta_cached: bool) -> Self {
        Self {
            decision,
            metafile: Some(metafile),
            meta_cached,
            tracker_mismatch: None,
        }
    }

    /// Attach a tracker-mismatch payload (identity-collision decisions).
    #[must_use]
    pub fn with_tracker_mismatch(mut self, mismatch: TrackerMismatch) -> Self {
        self.tracker_mismatch = Some(mismatch);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actionable_match_covers_all_three_match_variants() {
        assert!(Decision::Match.is_actionable_match());
        assert!(Decision::MatchSizeOnly.is_actionable_match());
        assert!(Decision::MatchPartial.is_actionable_match());
        assert!(!Decision::FileTreeMismatch.is_actionable_match());
    }

    #[test]
    fn only_cross_tracker_variant_is_collision() {
        assert!(Decision::InfoHashAlreadyExistsAnotherTracker.is_cross_tracker_collision());
        assert!(!Decision::InfoHashAlreadyExists.is_cross_tracker_collision());
        assert!(!Decision::SameInfoHash.is_cross_tracker_collision());
    }

    #[test]
    fn rejected_assessment_has_no_metafile() {
        let assessment = ResultAssessment::rejected(Decision::BlockedRelease);
        assert!(assessment.metafile.is_none());
        assert!(!assessment.meta_cached);
    }
}
