//! Configuration structures loaded from TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "crondeck".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/crondeck.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    5
}

fn default_crontab_program() -> String {
    "crontab".to_string()
}

fn default_crontab_timeout() -> u64 {
    10
}

fn default_scripts_directory() -> String {
    "scripts".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// `host:port` for binding the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

// ============================================================================
// Crontab / Scripts / Tasks Configuration
// ============================================================================

/// How the OS crontab is read and replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrontabConfig {
    /// The crontab binary, resolved through `PATH` when not absolute.
    #[serde(default = "default_crontab_program")]
    pub program: String,

    /// Passed as `-u <user>`; the current user when unset.
    #[serde(default)]
    pub user: Option<String>,

    /// Upper bound for one reader or writer invocation, in seconds.
    #[serde(default = "default_crontab_timeout")]
    pub timeout_secs: u64,
}

impl Default for CrontabConfig {
    fn default() -> Self {
        Self {
            program: default_crontab_program(),
            user: None,
            timeout_secs: default_crontab_timeout(),
        }
    }
}

/// Where generated scripts and their logs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    #[serde(default = "default_scripts_directory")]
    pub directory: String,

    /// Defaults to `directory`.
    #[serde(default)]
    pub log_directory: Option<String>,

    /// Append ` >> <log> 2>&1` to generated commands.
    #[serde(default)]
    pub capture_output: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            directory: default_scripts_directory(),
            log_directory: None,
            capture_output: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Keep the previous script file when a task is edited.
    #[serde(default = "default_true")]
    pub retain_previous_script_on_edit: bool,

    /// Remove a freshly generated script when installing its line fails.
    #[serde(default = "default_true")]
    pub cleanup_orphaned_scripts: bool,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            retain_previous_script_on_edit: true,
            cleanup_orphaned_scripts: true,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Maximum file size in bytes before rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Maximum number of rotated files to keep
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_files: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Converts the file representation into the runtime [`LoggerConfig`].
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.format.parse::<LogFormat>().map_err(|e| {
            ConfigError::validation("logger.file.format".to_string(), e.to_string())
        })?;
        let rotation = RotationConfig::new(self.rotation.max_size, self.rotation.max_files)
            .map_err(|e| {
                ConfigError::validation("logger.file.rotation".to_string(), e.to_string())
            })?;

        FileConfig::new(
            self.enabled,
            PathBuf::from(self.path),
            self.append,
            format,
            rotation,
        )
        .map_err(|e| ConfigError::validation("logger.file".to_string(), e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub crontab: CrontabConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub tasks: TasksConfig,
}
