//! Loads a [`Config`] from a YAML file, applies `CROSS_SEED_*` environment
//! overrides, and validates the result eagerly.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Config, MatchModeConfig};
use crate::validate;

/// Load and validate configuration from `path`, with `CROSS_SEED_*`
/// environment-variable overrides applied on top of the file's values.
///
/// # Errors
///
/// Returns an error if the file can't be read, isn't valid YAML, an
/// environment override can't be parsed, or the result fails validation.
pub fn load(path: &Path) -> ConfigResult<Config> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseFailed { source })?;
    let overrides: HashMap<String, String> = env::vars().filter(|(key, _)| key.starts_with("CROSS_SEED_")).collect();
    apply_overrides(&mut config, &overrides)?;
    validate::validate(&config)?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, vars: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(value) = read_var(vars, "CROSS_SEED_DATABASE_URL") {
        config.database_url = value.to_string();
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_TORRENT_CACHE_DIR") {
        config.torrent_cache_dir = PathBuf::from(value);
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_MATCH_MODE") {
        config.match_mode = parse_match_mode(value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_FUZZY_SIZE_FACTOR") {
        config.fuzzy_size_factor = parse_f64("CROSS_SEED_FUZZY_SIZE_FACTOR", value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_INCLUDE_SINGLE_EPISODES") {
        config.include_single_episodes = parse_bool("CROSS_SEED_INCLUDE_SINGLE_EPISODES", value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_USE_CLIENT_TORRENTS") {
        config.use_client_torrents = parse_bool("CROSS_SEED_USE_CLIENT_TORRENTS", value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_ACTION_IS_INJECT") {
        config.action_is_inject = parse_bool("CROSS_SEED_ACTION_IS_INJECT", value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_RSS_CADENCE_SECS") {
        config.job_cadences.rss_secs = parse_u64("CROSS_SEED_RSS_CADENCE_SECS", value)?;
    }
    if let Some(value) = read_var(vars, "CROSS_SEED_SEARCH_CADENCE_SECS") {
        config.job_cadences.search_secs = parse_u64("CROSS_SEED_SEARCH_CADENCE_SECS", value)?;
    }
    Ok(())
}

fn read_var<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(String::as_str).filter(|value| !value.is_empty())
}

fn parse_match_mode(value: &str) -> ConfigResult<MatchModeConfig> {
    match value {
        "strict" => Ok(MatchModeConfig::Strict),
        "flexible" => Ok(MatchModeConfig::Flexible),
        "partial" => Ok(MatchModeConfig::Partial),
        _ => Err(ConfigError::EnvOverrideInvalid {
            var: "CROSS_SEED_MATCH_MODE",
            reason: "expected strict|flexible|partial",
        }),
    }
}

fn parse_f64(var: &'static str, value: &str) -> ConfigResult<f64> {
    value
        .parse()
        .map_err(|_err| ConfigError::EnvOverrideInvalid { var, reason: "expected a floating-point number" })
}

fn parse_u64(var: &'static str, value: &str) -> ConfigResult<u64> {
    value
        .parse()
        .map_err(|_err| ConfigError::EnvOverrideInvalid { var, reason: "expected a non-negative integer" })
}

fn parse_bool(var: &'static str, value: &str) -> ConfigResult<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" => Ok(true),
        "0" | "false" | "FALSE" | "no" => Ok(false),
        _ => Err(ConfigError::EnvOverrideInvalid { var, reason: "expected a boolean" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_minimal_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "database_url: postgres://localhost/cross_seed\ntorrent_cache_dir: /var/lib/cross-seed/torrents\n",
        )
        .expect("write config file");
        path
    }

    fn minimal_config() -> Config {
        serde_yaml::from_str(
            "database_url: postgres://localhost/cross_seed\ntorrent_cache_dir: /var/lib/cross-seed/torrents\n",
        )
        .expect("minimal config should parse")
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_minimal_config(&dir);
        let config = load(&path).expect("should load");
        assert_eq!(config.match_mode, MatchModeConfig::Flexible);
        assert!((config.fuzzy_size_factor - 0.02).abs() < f64::EPSILON);
        assert_eq!(config.job_cadences.rss_secs, 0);
    }

    #[test]
    fn rejects_missing_file() {
        let err = load(Path::new("/nonexistent/config.yaml")).expect_err("should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "not: [valid").expect("write");
        let err = load(&path).expect_err("should fail");
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn override_replaces_match_mode() {
        let mut config = minimal_config();
        let vars = HashMap::from([("CROSS_SEED_MATCH_MODE".to_string(), "strict".to_string())]);
        apply_overrides(&mut config, &vars).expect("should apply");
        assert_eq!(config.match_mode, MatchModeConfig::Strict);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = minimal_config();
        let vars = HashMap::from([("CROSS_SEED_MATCH_MODE".to_string(), "sideways".to_string())]);
        let err = apply_overrides(&mut config, &vars).expect_err("should fail");
        assert!(matches!(err, ConfigError::EnvOverrideInvalid { .. }));
    }

    #[test]
    fn override_replaces_rss_cadence() {
        let mut config = minimal_config();
        let vars = HashMap::from([("CROSS_SEED_RSS_CADENCE_SECS".to_string(), "300".to_string())]);
        apply_overrides(&mut config, &vars).expect("should apply");
        assert_eq!(config.job_cadences.rss_secs, 300);
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = minimal_config();
        let original = config.database_url.clone();
        let vars = HashMap::from([("CROSS_SEED_DATABASE_URL".to_string(), String::new())]);
        apply_overrides(&mut config, &vars).expect("should apply");
        assert_eq!(config.database_url, original);
    }
}
