//! Error type for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for this crate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read configuration file")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file was not valid YAML, or did not match the expected
    /// shape.
    #[error("configuration file is not valid YAML")]
    ParseFailed {
        /// Underlying deserialization error.
        #[source]
        source: serde_yaml::Error,
    },
    /// An environment-variable override could not be parsed into its
    /// target type.
    #[error("environment variable override was invalid")]
    EnvOverrideInvalid {
        /// Name of the offending environment variable.
        var: &'static str,
        /// Machine-readable rejection reason.
        reason: &'static str,
    },
    /// A field failed eager validation.
    #[error("configuration field failed validation")]
    InvalidField {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Machine-readable rejection reason.
        reason: &'static str,
    },
}

/// Result alias for this crate's operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
