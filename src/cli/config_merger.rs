//! Merging of CLI argument overrides into file-based configuration.
//!
//! Precedence, lowest first: config files, `CRONDECK_*` environment
//! variables, global flags, subcommand flags.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Environment, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads the base configuration honoring `--config` and `--env`.
    ///
    /// # Errors
    /// Returns ConfigError if loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(path) = &cli.config {
            Self::validate_config_file_access(path)?;
            loader = loader.with_config_file(path);
        }

        let environment = loader.environment();
        Ok(Self::new(loader.load()?, environment))
    }

    /// clap already checked the path; it may have changed since.
    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file".to_string(),
                format!("Configuration file is not accessible: '{}'", path.display()),
            ));
        }
        Ok(())
    }

    /// Applies CLI overrides on top of the base configuration and validates
    /// the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);
        if let Some(command) = &cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        // Only `serve` carries overrides; the others read the crontab as configured.
        if let Commands::Serve {
            host,
            port,
            log_level,
            ..
        } = command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Subcommand level beats --verbose/--quiet.
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// The environment whose overlay was loaded.
    pub fn environment(&self) -> Environment {
        self.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merger() -> ConfigurationMerger {
        ConfigurationMerger::new(Settings::default(), Environment::Test)
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        merger().merge_cli_args(&cli).unwrap()
    }

    #[test]
    fn test_configuration_merger_new() {
        let merger = merger();
        assert_eq!(merger.config(), &Settings::default());
        assert_eq!(merger.environment(), Environment::Test);
    }

    #[test]
    fn test_merge_verbose_and_quiet_flags() {
        assert_eq!(merge(&["crondeck", "--verbose"]).logger.level, "debug");
        assert_eq!(merge(&["crondeck", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_merge_serve_host_and_port() {
        let merged = merge(&["crondeck", "serve", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["crondeck", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_non_serve_commands_keep_server_settings() {
        let merged = merge(&["crondeck", "describe", "* * * * *"]);
        assert_eq!(merged.server, Settings::default().server);
    }

    #[test]
    fn test_missing_config_file_is_rejected() {
        let err =
            ConfigurationMerger::validate_config_file_access(Path::new("/no/such/crondeck.toml"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
