//! Core assessment engine: classifies a candidate or already-parsed
//! metafile against a local searchee into exactly one
//! [`cross_seed_model::Decision`].

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cross_seed_cache::{GuidInfoHashMap, MetafileParser, TorrentCache};
use cross_seed_model::{Candidate, Decision, Metafile, ResultAssessment, Searchee, SearcheeLabel};
use tracing::{info, warn};

use crate::error::DecisionResult;
use crate::matching::{
    compare_file_trees_full, compare_file_trees_partial, compare_file_trees_size_only,
    season_pack_guard_triggered,
};
use crate::options::AssessmentOptions;
use crate::prefilter::{check_candidate, is_blocked, PrefilterRejection};
use crate::snatcher::{SnatchFailure, Snatcher};

const SNATCH_MAX_RETRIES: u32 = 4;
const SNATCH_DELAY_SEARCH: Duration = Duration::from_secs(60);
const SNATCH_DELAY_ANNOUNCE: Duration = Duration::from_secs(300);

/// The delay between snatch retries for a given searchee provenance.
#[must_use]
pub const fn retry_delay_for_label(label: SearcheeLabel) -> Duration {
    match label {
        SearcheeLabel::Announce => SNATCH_DELAY_ANNOUNCE,
        _ => SNATCH_DELAY_SEARCH,
    }
}

/// Either form the engine accepts: an unparsed candidate (runs the full
/// pre-filter and snatch pipeline) or an already-parsed metafile (skips
/// both; the caller vouches for it).
#[derive(Debug, Clone)]
pub enum CandidateOrMetafile {
    /// An indexer hit that has not yet been snatched.
    Candidate(Candidate),
    /// An already-parsed metafile, e.g. supplied by an injection request.
    Metafile(Metafile),
}

/// Resolves the current union of trackers a local client reports for a
/// given info-hash, used to detect tracker mismatches on identity
/// collisions. A thin seam over `cross-seed-data`'s
/// `ClientSearcheeStore` so this crate stays free of a direct `sqlx`
/// dependency.
#[async_trait]
pub trait TrackerLookup: Send + Sync {
    /// Fetch the known tracker set for `info_hash`, normalized.
    async fn trackers_for_info_hash(
        &self,
        info_hash: &str,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;
}

/// Attempts to evict a locally held conflicting info-hash so the new
/// candidate can take its place. A thin seam over `cross-seed-conflict`.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Attempt to resolve a conflict over `info_hash`, returning whether
    /// the incumbent was evicted.
    async fn resolve(
        &self,
        info_hash: &str,
        candidate_trackers: &[String],
        searchee_name: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

/// Core, storage-agnostic assessment engine.
pub struct DecisionEngine {
    cache: TorrentCache,
    parser: Arc<dyn MetafileParser>,
    snatcher: Arc<dyn Snatcher>,
    tracker_lookup: Arc<dyn TrackerLookup>,
    conflict_resolver: Arc<dyn ConflictResolver>,
    guid_info_hash_map: Arc<GuidInfoHashMap>,
    delay_search: Duration,
    delay_announce: Duration,
}

impl DecisionEngine {
    /// Construct an engine over its collaborators, using the real 1
    /// minute / 5 minute snatch retry delays.
    #[must_use]
    pub fn new(
        cache: TorrentCache,
        parser: Arc<dyn MetafileParser>,
        snatcher: Arc<dyn Snatcher>,
        tracker_lookup: Arc<dyn TrackerLookup>,
        conflict_resolver: Arc<dyn ConflictResolver>,
        guid_info_hash_map: Arc<GuidInfoHashMap>,
    ) -> Self {
        Self::with_retry_delays(
            cache,
            parser,
            snatcher,
            tracker_lookup,
            conflict_resolver,
            guid_info_hash_map,
            SNATCH_DELAY_SEARCH,
            SNATCH_DELAY_ANNOUNCE,
        )
    }

    /// Construct an engine with overridden retry delays, for tests that
    /// can't afford to wait on the real 1/5 minute cadence.
    #[must_use]
    pub fn with_retry_delays(
        cache: TorrentCache,
        parser: Arc<dyn MetafileParser>,
        snatcher: Arc<dyn Snatcher>,
        tracker_lookup: Arc<dyn TrackerLookup>,
        conflict_resolver: Arc<dyn ConflictResolver>,
        guid_info_hash_map: Arc<GuidInfoHashMap>,
        delay_search: Duration,
        delay_announce: Duration,
    ) -> Self {
        Self {
            cache,
            parser,
            snatcher,
            tracker_lookup,
            conflict_resolver,
            guid_info_hash_map,
            delay_search,
            delay_announce,
        }
    }

    /// Classify `input` against `searchee`.
    ///
    /// `excluded_info_hashes` is mutated in place: a successful conflict
    /// resolution removes the freed hash so a retried assessment of the
    /// same candidate doesn't re-trigger eviction.
    ///
    /// # Errors
    ///
    /// Returns an error if the torrent cache or metafile parsing fails in
    /// a way the taxonomy has no decision for.
    pub async fn assess(
        &self,
        input: CandidateOrMetafile,
        searchee: &Searchee,
        excluded_info_hashes: &mut Vec<String>,
        block_list: &[String],
        options: &AssessmentOptions,
        indexer_id: i64,
    ) -> DecisionResult<ResultAssessment> {
        if is_blocked(&searchee.title, block_list) {
            return Ok(ResultAssessment::rejected(Decision::BlockedRelease));
        }

        let mut meta_cached = false;
        let metafile = match input {
            CandidateOrMetafile::Metafile(metafile) => metafile,
            CandidateOrMetafile::Candidate(candidate) => {
                if let Err(rejection) =
                    check_candidate(&candidate, searchee, options.fuzzy_size_factor)
                {
                    return Ok(ResultAssessment::rejected(prefilter_decision(rejection)));
                }

                let Some(link) = candidate.link.clone() else {
                    return Ok(ResultAssessment::rejected(Decision::NoDownloadLink));
                };

                let correlated = match self.guid_info_hash_map.get(&candidate.guid, &link).await {
                    Some(info_hash) => self
                        .cache
                        .load_parsed(&info_hash, self.parser.as_ref())
                        .await
                        .ok()
                        .flatten(),
                    None => None,
                };

                if let Some(metafile) = correlated {
                    meta_cached = true;
                    if is_blocked(&metafile.name, block_list) {
                        return Ok(ResultAssessment::rejected(Decision::BlockedRelease));
                    }
                    metafile
                } else {
                    match self.snatch_with_retries(&link, searchee.label).await {
                        Ok(bytes) => {
                            let metafile = self
                                .parser
                                .parse(&bytes)
                                .map_err(|source| crate::error::DecisionError::ParseFailed { source })?;
                            self.cache.store(&metafile.info_hash, &bytes).await?;
                            self.guid_info_hash_map
                                .insert(&candidate.guid, &link, &metafile.info_hash)
                                .await;
                            meta_cached = true;
                            if is_blocked(&metafile.name, block_list) {
                                return Ok(ResultAssessment::rejected(Decision::BlockedRelease));
                            }
                            metafile
                        }
                        Err(SnatchFailure::MagnetLink) => {
                            return Ok(ResultAssessment::rejected(Decision::MagnetLink));
                        }
                        Err(SnatchFailure::RateLimited) => {
                            return Ok(ResultAssessment::rejected(Decision::RateLimited));
                        }
                        Err(SnatchFailure::Other(source)) => {
                            warn!(error = %source, indexer_id, "snatch failed after all retries");
                            return Ok(ResultAssessment::rejected(Decision::DownloadFailed));
                        }
                    }
                }
            }
        };

        if let Some(own_hash) = &searchee.info_hash
            && metafile.info_hash == *own_hash
        {
            let known = self
                .tracker_lookup
                .trackers_for_info_hash(&metafile.info_hash)
                .await
                .unwrap_or_default();
            let mismatch = cross_seed_model::TrackerMismatch {
                candidate_trackers: metafile.normalized_trackers(),
                known_trackers: known,
            };
            let decision = if mismatch.candidate_trackers == mismatch.known_trackers {
                Decision::SameInfoHash
            } else {
                Decision::InfoHashAlreadyExistsAnotherTracker
            };
            return Ok(
                ResultAssessment::with_metafile(decision, metafile, meta_cached)
                    .with_tracker_mismatch(mismatch),
            );
        }

        if let Some(position) = excluded_info_hashes
            .iter()
            .position(|hash| *hash == metafile.info_hash)
        {
            let known = self
                .tracker_lookup
                .trackers_for_info_hash(&metafile.info_hash)
                .await
                .unwrap_or_default();
            let candidate_trackers = metafile.normalized_trackers();
            let mismatch = cross_seed_model::TrackerMismatch {
                candidate_trackers: candidate_trackers.clone(),
                known_trackers: known,
            };

            let evicted = self
                .conflict_resolver
                .resolve(&metafile.info_hash, &candidate_trackers, &searchee.title)
                .await
                .unwrap_or(false);

            if evicted {
                excluded_info_hashes.remove(position);
                info!(info_hash = %metafile.info_hash, "conflict resolved, proceeding to content matching");
            } else {
                let decision = if mismatch.candidate_trackers == mismatch.known_trackers {
                    Decision::InfoHashAlreadyExists
                } else {
                    Decision::InfoHashAlreadyExistsAnotherTracker
                };
                return Ok(
                    ResultAssessment::with_metafile(decision, metafile, meta_cached)
                        .with_tracker_mismatch(mismatch),
                );
            }
        }

        Ok(self.assess_content(metafile, searchee, options, meta_cached))
    }

    fn assess_content(
        &self,
        metafile: Metafile,
        searchee: &Searchee,
        options: &AssessmentOptions,
        meta_cached: bool,
    ) -> ResultAssessment {
        if season_pack_guard_triggered(&searchee.title, &metafile, options.include_single_episodes)
        {
            return ResultAssessment::with_metafile(Decision::FileTreeMismatch, metafile, meta_cached);
        }

        if compare_file_trees_full(&metafile, searchee) {
            return ResultAssessment::with_metafile(Decision::Match, metafile, meta_cached);
        }

        if options.match_mode.allows_size_only() && compare_file_trees_size_only(&metafile, searchee)
        {
            return ResultAssessment::with_metafile(Decision::MatchSizeOnly, metafile, meta_cached);
        }

        if options.match_mode.allows_partial()
            && compare_file_trees_partial(&metafile, searchee, options.min_size_ratio)
        {
            return ResultAssessment::with_metafile(Decision::MatchPartial, metafile, meta_cached);
        }

        let decision = if metafile.length == searchee.length {
            Decision::FileTreeMismatch
        } else if options.match_mode.allows_partial() {
            Decision::PartialSizeMismatch
        } else {
            Decision::SizeMismatch
        };
        ResultAssessment::with_metafile(decision, metafile, meta_cached)
    }

    async fn snatch_with_retries(
        &self,
        link: &str,
        label: SearcheeLabel,
    ) -> Result<Vec<u8>, SnatchFailure> {
        let delay = match label {
            SearcheeLabel::Announce => self.delay_announce,
            _ => self.delay_search,
        };
        let mut attempt = 0;
        loop {
            match self.snatcher.snatch(link).await {
                Ok(bytes) => return Ok(bytes),
                Err(SnatchFailure::MagnetLink) => return Err(SnatchFailure::MagnetLink),
                Err(SnatchFailure::RateLimited) if attempt >= SNATCH_MAX_RETRIES => {
                    return Err(SnatchFailure::RateLimited);
                }
                Err(SnatchFailure::Other(source)) if attempt >= SNATCH_MAX_RETRIES => {
                    return Err(SnatchFailure::Other(source));
                }
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn prefilter_decision(rejection: PrefilterRejection) -> Decision {
    match rejection {
        PrefilterRejection::ReleaseGroup => Decision::ReleaseGroupMismatch,
        PrefilterRejection::Resolution => Decision::ResolutionMismatch,
        PrefilterRejection::Source => Decision::SourceMismatch,
        PrefilterRejection::ProperRepack => Decision::ProperRepackMismatch,
        PrefilterRejection::FuzzySize => Decision::FuzzySizeMismatch,
        PrefilterRejection::NoDownloadLink => Decision::NoDownloadLink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cross_seed_model::{MetafileFile, Privacy};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubParser;
    impl MetafileParser for StubParser {
        fn parse(&self, bytes: &[u8]) -> Result<Metafile, Box<dyn Error + Send + Sync>> {
            Ok(Metafile {
                info_hash: String::from_utf8_lossy(bytes).to_string(),
                length: 100,
                piece_length: 50,
                name: "Some.Release".to_string(),
                files: vec![MetafileFile::new("Some.Release/a.mkv", 100)],
                trackers: vec!["tracker.example".to_string()],
                private: Privacy::Private,
            })
        }
    }

    struct ImmediateSnatcher {
        hash: String,
    }
    #[async_trait]
    impl Snatcher for ImmediateSnatcher {
        async fn snatch(&self, _link: &str) -> Result<Vec<u8>, SnatchFailure> {
            Ok(self.hash.clone().into_bytes())
        }
    }

    struct FlakySnatcher {
        hash: String,
        failures_before_success: AtomicU32,
    }
    #[async_trait]
    impl Snatcher for FlakySnatcher {
        async fn snatch(&self, _link: &str) -> Result<Vec<u8>, SnatchFailure> {
            if self.failures_before_success.fetch_sub(1, Ordering::SeqCst) > 0 {
                return Err(SnatchFailure::Other("transient".into()));
            }
            Ok(self.hash.clone().into_bytes())
        }
    }

    struct NoKnownTrackers;
    #[async_trait]
    impl TrackerLookup for NoKnownTrackers {
        async fn trackers_for_info_hash(
            &self,
            _info_hash: &str,
        ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
            Ok(Vec::new())
        }
    }

    struct NeverResolves;
    #[async_trait]
    impl ConflictResolver for NeverResolves {
        async fn resolve(
            &self,
            _info_hash: &str,
            _candidate_trackers: &[String],
            _searchee_name: &str,
        ) -> Result<bool, Box<dyn Error + Send + Sync>> {
            Ok(false)
        }
    }

    #[test]
    fn retry_delay_is_longer_for_announce_label() {
        assert_eq!(retry_delay_for_label(SearcheeLabel::Announce), SNATCH_DELAY_ANNOUNCE);
        assert_eq!(retry_delay_for_label(SearcheeLabel::Search), SNATCH_DELAY_SEARCH);
    }

    fn searchee() -> Searchee {
        Searchee {
            title: "Some.Release".to_string(),
            info_hash: None,
            path: None,
            files: vec![MetafileFile::new("Some.Release/a.mkv", 100)],
            length: 100,
            label: SearcheeLabel::Search,
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            name: "Some.Release".to_string(),
            guid: "guid-1".to_string(),
            link: Some("https://example.invalid/1".to_string()),
            tracker: "tracker.example".to_string(),
            indexer_id: 1,
            size: Some(100),
        }
    }

    async fn engine(snatcher: Arc<dyn Snatcher>) -> (DecisionEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("cache");
        let engine = DecisionEngine::with_retry_delays(
            cache,
            Arc::new(StubParser),
            snatcher,
            Arc::new(NoKnownTrackers),
            Arc::new(NeverResolves),
            Arc::new(GuidInfoHashMap::new()),
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        (engine, dir)
    }

    fn options() -> AssessmentOptions {
        AssessmentOptions {
            match_mode: crate::options::MatchMode::Flexible,
            fuzzy_size_factor: 0.02,
            min_size_ratio: 0.9,
            include_single_episodes: false,
        }
    }

    #[tokio::test]
    async fn candidate_match_flows_through_snatch_and_content_match() {
        let hash = "a".repeat(40);
        let (engine, _dir) = engine(Arc::new(ImmediateSnatcher { hash: hash.clone() })).await;
        let mut excluded = Vec::new();
        let result = engine
            .assess(
                CandidateOrMetafile::Candidate(candidate()),
                &searchee(),
                &mut excluded,
                &[],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::Match);
        assert_eq!(result.metafile.expect("metafile").info_hash, hash);
    }

    #[tokio::test]
    async fn blocked_release_short_circuits_before_snatch() {
        let (engine, _dir) = engine(Arc::new(ImmediateSnatcher { hash: "b".repeat(40) })).await;
        let mut excluded = Vec::new();
        let result = engine
            .assess(
                CandidateOrMetafile::Candidate(candidate()),
                &searchee(),
                &mut excluded,
                &["some.release".to_string()],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::BlockedRelease);
    }

    #[tokio::test]
    async fn snatch_retries_until_success() {
        let hash = "c".repeat(40);
        let snatcher = FlakySnatcher {
            hash: hash.clone(),
            failures_before_success: AtomicU32::new(2),
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("cache");
        let engine = DecisionEngine::with_retry_delays(
            cache,
            Arc::new(StubParser),
            Arc::new(snatcher),
            Arc::new(NoKnownTrackers),
            Arc::new(NeverResolves),
            Arc::new(GuidInfoHashMap::new()),
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        let mut excluded = Vec::new();
        let result = engine
            .assess(
                CandidateOrMetafile::Candidate(candidate()),
                &searchee(),
                &mut excluded,
                &[],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::Match);
    }

    #[tokio::test]
    async fn metafile_form_skips_prefilters_entirely() {
        let (engine, _dir) = engine(Arc::new(ImmediateSnatcher { hash: "d".repeat(40) })).await;
        let metafile = Metafile {
            info_hash: "d".repeat(40),
            length: 100,
            piece_length: 50,
            name: "Unrelated.Name".to_string(),
            files: vec![MetafileFile::new("Some.Release/a.mkv", 100)],
            trackers: vec![],
            private: Privacy::Private,
        };
        let mut excluded = Vec::new();
        let result = engine
            .assess(
                CandidateOrMetafile::Metafile(metafile),
                &searchee(),
                &mut excluded,
                &[],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::Match);
    }

    #[tokio::test]
    async fn same_info_hash_returns_same_info_hash_when_trackers_match() {
        let hash = "e".repeat(40);
        let (engine, _dir) = engine(Arc::new(ImmediateSnatcher { hash: hash.clone() })).await;
        let mut s = searchee();
        s.info_hash = Some(hash.clone());
        let metafile = Metafile {
            info_hash: hash,
            length: 100,
            piece_length: 50,
            name: "Some.Release".to_string(),
            files: vec![],
            trackers: vec![],
            private: Privacy::Private,
        };
        let mut excluded = Vec::new();
        let result = engine
            .assess(
                CandidateOrMetafile::Metafile(metafile),
                &s,
                &mut excluded,
                &[],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::SameInfoHash);
    }

    #[tokio::test]
    async fn excluded_hash_without_eviction_reports_already_exists() {
        let hash = "f".repeat(40);
        let (engine, _dir) = engine(Arc::new(ImmediateSnatcher { hash: hash.clone() })).await;
        let metafile = Metafile {
            info_hash: hash.clone(),
            length: 100,
            piece_length: 50,
            name: "Some.Release".to_string(),
            files: vec![],
            trackers: vec![],
            private: Privacy::Private,
        };
        let mut excluded = vec![hash];
        let result = engine
            .assess(
                CandidateOrMetafile::Metafile(metafile),
                &searchee(),
                &mut excluded,
                &[],
                &options(),
                1,
            )
            .await
            .expect("assess");
        assert_eq!(result.decision, Decision::InfoHashAlreadyExists);
        assert!(!excluded.is_empty());
    }
}
