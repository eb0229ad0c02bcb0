//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Dotted path, e.g. `crontab.timeout_secs`
        field: String,
        message: String,
    },

    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Two settings that cannot be combined were both given.
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    /// Raised by the `config` crate while merging sources.
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}
