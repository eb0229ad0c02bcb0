//! Command-line interface: argument parsing, configuration merging and
//! command dispatch.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::{CommandOutcome, execute_command};
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::{self, Settings};
use crate::logger::init_logger;

/// Loads configuration files, applies CLI overrides and validates the result.
///
/// Returns the settings together with the environment whose overlay was
/// loaded.
///
/// # Errors
/// Configuration loading, merging or validation failures
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<(Settings, config::Environment)> {
    let merger = ConfigurationMerger::from_cli(cli).context("Configuration error")?;
    let settings = merger
        .merge_cli_args(cli)
        .context("Configuration merge error")?;
    Ok((settings, merger.environment()))
}

/// Installs the global tracing subscriber described by `settings.logger`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
