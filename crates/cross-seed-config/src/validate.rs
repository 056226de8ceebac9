//! Eager validation: zero cadence where one is required and negative
//! fuzzy factors both surface at load time rather than mid-run.

use crate::error::{ConfigError, ConfigResult};
use crate::model::Config;

/// Validate a fully loaded, override-applied configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] on the first validation failure
/// encountered.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_fuzzy_factor("fuzzy_size_factor", config.fuzzy_size_factor)?;
    for factor in config.fuzzy_size_factor_overrides.values() {
        validate_fuzzy_factor("fuzzy_size_factor_overrides", *factor)?;
    }

    if config.snatch.max_retries == 0 {
        return Err(ConfigError::InvalidField {
            field: "snatch.max_retries",
            reason: "must_be_positive",
        });
    }

    validate_required_cadence(
        "job_cadences.update_indexer_caps_secs",
        config.job_cadences.update_indexer_caps_secs,
    )?;
    validate_required_cadence("job_cadences.inject_secs", config.job_cadences.inject_secs)?;
    validate_required_cadence("job_cadences.cleanup_secs", config.job_cadences.cleanup_secs)?;
    validate_required_cadence(
        "job_cadences.collision_recheck_secs",
        config.job_cadences.collision_recheck_secs,
    )?;

    if config.torrent_cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "torrent_cache_dir",
            reason: "must_not_be_empty",
        });
    }
    if config.database_url.is_empty() {
        return Err(ConfigError::InvalidField {
            field: "database_url",
            reason: "must_not_be_empty",
        });
    }

    Ok(())
}

fn validate_fuzzy_factor(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_sign_negative() || !value.is_finite() {
        return Err(ConfigError::InvalidField { field, reason: "must_be_non_negative" });
    }
    Ok(())
}

/// Unlike `rss_secs`/`search_secs`, these jobs can never be disabled: an
/// explicit override of zero is a configuration error rather than a way to
/// turn the job off.
fn validate_required_cadence(field: &'static str, value: Option<u64>) -> ConfigResult<()> {
    if value == Some(0) {
        return Err(ConfigError::InvalidField { field, reason: "must_not_be_zero" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobCadencesConfig, SnatchConfig};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn base() -> Config {
        Config {
            database_url: "postgres://localhost/cross_seed".to_string(),
            torrent_cache_dir: PathBuf::from("/var/lib/cross-seed/torrents"),
            match_mode: crate::model::MatchModeConfig::Flexible,
            fuzzy_size_factor: 0.02,
            fuzzy_size_factor_overrides: BTreeMap::new(),
            include_single_episodes: false,
            indexers: Vec::new(),
            block_list: Vec::new(),
            snatch: SnatchConfig::default(),
            job_cadences: JobCadencesConfig::default(),
            use_client_torrents: false,
            action_is_inject: false,
        }
    }

    #[test]
    fn accepts_defaults() {
        validate(&base()).expect("defaults should validate");
    }

    #[test]
    fn rejects_negative_fuzzy_factor() {
        let mut config = base();
        config.fuzzy_size_factor = -0.1;
        let err = validate(&config).expect_err("should reject");
        assert!(matches!(err, ConfigError::InvalidField { field: "fuzzy_size_factor", .. }));
    }

    #[test]
    fn accepts_block_list_entries_with_regex_metacharacters() {
        let mut config = base();
        config.block_list.push("(Unrated".to_string());
        config.block_list.push("[REPACK]".to_string());
        validate(&config).expect("substrings are literal, not regex");
    }

    #[test]
    fn rejects_zero_required_cadence() {
        let mut config = base();
        config.job_cadences.cleanup_secs = Some(0);
        let err = validate(&config).expect_err("should reject");
        assert!(matches!(
            err,
            ConfigError::InvalidField { field: "job_cadences.cleanup_secs", .. }
        ));
    }

    #[test]
    fn allows_rss_and_search_cadence_of_zero() {
        let mut config = base();
        config.job_cadences.rss_secs = 0;
        config.job_cadences.search_secs = 0;
        validate(&config).expect("zero rss/search cadence disables, doesn't fail");
    }

    #[test]
    fn rejects_zero_max_retries() {
        let mut config = base();
        config.snatch.max_retries = 0;
        let err = validate(&config).expect_err("should reject");
        assert!(matches!(err, ConfigError::InvalidField { field: "snatch.max_retries", .. }));
    }
}
