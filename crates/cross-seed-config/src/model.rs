//! The typed configuration model, as loaded from YAML and narrowed by
//! environment-variable overrides.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mirrors `cross-seed-decision`'s `MatchMode` without introducing a
/// dependency cycle on the decision crate from the config crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchModeConfig {
    /// Require a full file-tree match.
    Strict,
    /// Allow a size-only match when the tree doesn't line up exactly.
    Flexible,
    /// Additionally allow a partial, piece-aligned match.
    Partial,
}

/// A configured indexer and the tracker hostnames it's known to announce
/// under.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Indexer's display name, used as its persistence key.
    pub name: String,
    /// Tracker hostnames this indexer is known to announce under.
    #[serde(default)]
    pub trackers: Vec<String>,
}

/// Snatch retry and backoff tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnatchConfig {
    /// Maximum snatch attempts before giving up with `DOWNLOAD_FAILED`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Retry delay, in seconds, for searchees labeled `SEARCH`.
    #[serde(default = "default_delay_search_secs")]
    pub delay_search_secs: u64,
    /// Retry delay, in seconds, for searchees labeled `ANNOUNCE`.
    #[serde(default = "default_delay_announce_secs")]
    pub delay_announce_secs: u64,
}

const fn default_max_retries() -> u32 {
    4
}
const fn default_delay_search_secs() -> u64 {
    60
}
const fn default_delay_announce_secs() -> u64 {
    300
}

impl Default for SnatchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_search_secs: default_delay_search_secs(),
            delay_announce_secs: default_delay_announce_secs(),
        }
    }
}

/// Job cadences. `rss_secs`/`search_secs` are always operator-configured
/// (zero disables the job); the remainder default to the fixed intervals
/// described for this system and may only be overridden to a positive
/// value, never disabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobCadencesConfig {
    /// `RSS` job cadence in seconds. Zero disables the job.
    #[serde(default)]
    pub rss_secs: u64,
    /// `SEARCH` job cadence in seconds. Zero disables the job.
    #[serde(default)]
    pub search_secs: u64,
    /// `UPDATE_INDEXER_CAPS` cadence override, in seconds. Defaults to one
    /// day; may not be set to zero.
    #[serde(default)]
    pub update_indexer_caps_secs: Option<u64>,
    /// `INJECT` cadence override, in seconds. Defaults to one hour; may
    /// not be set to zero.
    #[serde(default)]
    pub inject_secs: Option<u64>,
    /// `CLEANUP` cadence override, in seconds. Defaults to one day; may
    /// not be set to zero.
    #[serde(default)]
    pub cleanup_secs: Option<u64>,
    /// `COLLISION_RECHECK` cadence override, in seconds. Defaults to one
    /// hour when `use_client_torrents` is set; may not be set to zero.
    #[serde(default)]
    pub collision_recheck_secs: Option<u64>,
}

impl Default for JobCadencesConfig {
    fn default() -> Self {
        Self {
            rss_secs: 0,
            search_secs: 0,
            update_indexer_caps_secs: None,
            inject_secs: None,
            cleanup_secs: None,
            collision_recheck_secs: None,
        }
    }
}

/// Top-level, fully loaded configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Directory cached `.torrent` files are stored under.
    pub torrent_cache_dir: PathBuf,
    /// Default content-matching strictness.
    #[serde(default = "default_match_mode")]
    pub match_mode: MatchModeConfig,
    /// Default fuzzy-size tolerance, applied when no per-source override
    /// matches a searchee's label.
    #[serde(default = "default_fuzzy_size_factor")]
    pub fuzzy_size_factor: f64,
    /// Per-source-label fuzzy-size overrides (e.g. `"rss"`, `"announce"`),
    /// keyed by the lowercase label name.
    #[serde(default)]
    pub fuzzy_size_factor_overrides: BTreeMap<String, f64>,
    /// Whether a season-pack searchee may match a single-episode
    /// candidate.
    #[serde(default)]
    pub include_single_episodes: bool,
    /// Configured indexers and their known tracker hostnames.
    #[serde(default)]
    pub indexers: Vec<IndexerConfig>,
    /// Release-name substrings rejected outright, matched case-insensitively
    /// against the literal text (no regex interpretation).
    #[serde(default)]
    pub block_list: Vec<String>,
    /// Snatch retry/backoff tuning.
    #[serde(default)]
    pub snatch: SnatchConfig,
    /// Job cadences.
    #[serde(default)]
    pub job_cadences: JobCadencesConfig,
    /// Whether the scheduler should run `COLLISION_RECHECK` at all. Off by
    /// default since it requires live torrent-client residency data.
    #[serde(default)]
    pub use_client_torrents: bool,
    /// Whether the configured action for newly matched candidates is
    /// injection (gates the `INJECT` job's eligibility).
    #[serde(default)]
    pub action_is_inject: bool,
}

const fn default_match_mode() -> MatchModeConfig {
    MatchModeConfig::Flexible
}

const fn default_fuzzy_size_factor() -> f64 {
    0.02
}
