//! Layered configuration: TOML files plus `CRONDECK_*` environment overrides.
//!
//! # Priority (lowest to highest)
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml` (not committed)
//! 4. `CRONDECK_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, CrontabConfig, LoggerSettings, ScriptsConfig, ServerConfig, Settings,
    TasksConfig,
};
