//! Range and format checks for loaded settings.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CrontabConfig, FileSettings, LoggerSettings, ScriptsConfig, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CrontabConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::validation(
                "crontab.program",
                "The crontab program must not be empty.",
            ));
        }

        if self.user.as_deref().is_some_and(|user| user.trim().is_empty()) {
            return Err(ConfigError::validation(
                "crontab.user",
                "The crontab user must not be blank; omit it to use the current user.",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::validation(
                "crontab.timeout_secs",
                "Crontab timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl ScriptsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.trim().is_empty() {
            return Err(ConfigError::validation(
                "scripts.directory",
                "The scripts directory must not be empty.",
            ));
        }

        if self
            .log_directory
            .as_deref()
            .is_some_and(|dir| dir.trim().is_empty())
        {
            return Err(ConfigError::validation(
                "scripts.log_directory",
                "The log directory must not be blank; omit it to log next to the scripts.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        if self.rotation.max_size == 0 || self.rotation.max_files == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation",
                "Rotation max_size and max_files must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()
    }
}

impl Settings {
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.crontab.validate()?;
        self.scripts.validate()?;
        Ok(())
    }
}
