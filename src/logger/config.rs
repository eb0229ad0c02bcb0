//! Runtime logger configuration.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

use crate::logger::error::LoggerError;

type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// An `EnvFilter` directive, usually just a level name.
    pub level: String,
}

impl LoggerConfig {
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config(
                "At least one output (console or file) must be enabled",
            ));
        }
        self.file.validate()
    }

    /// The level part of the filter directive, when it is a plain level name.
    pub fn parse_level(&self) -> Result<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| LoggerError::config(format!("Invalid log level: {}", self.level)))
    }

    /// Replaces the level directive, e.g. from `-v` / `-q` flags.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colors; only applied when stdout is a terminal.
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
    pub rotation: RotationConfig,
}

impl FileConfig {
    pub fn new(
        enabled: bool,
        path: PathBuf,
        append: bool,
        format: LogFormat,
        rotation: RotationConfig,
    ) -> Result<Self> {
        let config = Self {
            enabled,
            path,
            append,
            format,
            rotation,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("File path is required when file logging is enabled"));
        }
        self.rotation.validate()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/crondeck.log"),
            append: true,
            format: LogFormat::default(),
            rotation: RotationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggerError::config(format!(
                "Invalid log format '{s}'. Valid formats are: full, compact, json"
            ))),
        }
    }
}

/// Size-based rotation of the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Rotate once the active file reaches this many bytes.
    pub max_size: u64,
    /// Rotated files kept next to the active one.
    pub max_files: usize,
}

impl RotationConfig {
    pub fn new(max_size: u64, max_files: usize) -> Result<Self> {
        let config = Self {
            max_size,
            max_files,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(LoggerError::config("max_size must be greater than 0"));
        }
        if self.max_files == 0 {
            return Err(LoggerError::config("max_files must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}
