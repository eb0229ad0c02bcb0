//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::schedule::Locale;

/// Manage crontab entries and the scripts they run
#[derive(Parser, Debug)]
#[command(name = "crondeck")]
#[command(about = "Manage crontab entries and the scripts they run")]
#[command(long_about = "
crondeck keeps the current user's crontab, the scripts its entries run and
the index-based task list shown to clients in step. It serves a JSON API and
offers a few commands for inspecting the table from a terminal.

EXAMPLES:
    # Start the server with default configuration
    crondeck serve

    # Listen on all interfaces
    crondeck serve --host 0.0.0.0 --port 8080

    # Try the API without touching the real crontab
    crondeck serve --in-memory

    # Check configuration without starting the server
    crondeck serve --dry-run

    # Show the installed crontab
    crondeck list

    # Explain a schedule
    crondeck describe '0 9 * * 1-5' --locale zh
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads this single TOML file instead of the layered `config/` directory.
    /// `CRONDECK_*` environment variables still apply on top.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{environment}.toml` overlay is loaded.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    ///
    /// Examples:
    ///   crondeck serve                            # Start with defaults
    ///   crondeck serve --host 0.0.0.0 --port 80   # Bind to all interfaces on port 80
    ///   crondeck serve --dry-run                  # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override; takes precedence over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,

        /// Serve an empty in-memory crontab instead of the OS crontab
        ///
        /// Scripts are still written to the scripts directory.
        #[arg(long)]
        in_memory: bool,
    },

    /// Print the installed crontab with task indices
    List {
        /// Language for schedule descriptions
        #[arg(long, value_name = "LOCALE", value_parser = super::validation::validate_locale)]
        locale: Option<Locale>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Describe a five-field cron expression
    Describe {
        /// The expression, quoted as one argument
        expression: String,

        #[arg(long, value_name = "LOCALE", value_parser = super::validation::validate_locale)]
        locale: Option<Locale>,
    },

    /// Print the schedule presets
    Presets {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Whether this invocation ends by running the HTTP server.
    pub fn starts_server(&self) -> bool {
        match &self.command {
            None => true,
            Some(Commands::Serve { dry_run, .. }) => !dry_run,
            Some(_) => false,
        }
    }

    /// Whether the server should use the in-memory crontab.
    pub fn in_memory(&self) -> bool {
        matches!(self.command, Some(Commands::Serve { in_memory: true, .. }))
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
        .to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["crondeck", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["crondeck", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior_starts_server() {
        let cli = Cli::try_parse_from(["crondeck"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.starts_server());
        assert!(!cli.in_memory());
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "crondeck",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--in-memory",
        ])
        .unwrap();

        assert!(cli.starts_server());
        assert!(cli.in_memory());
        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                dry_run,
                ..
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {other:?}"),
        }
    }

    #[test]
    fn test_dry_run_does_not_start_server() {
        let cli = Cli::try_parse_from(["crondeck", "serve", "--dry-run"]).unwrap();
        assert!(!cli.starts_server());
    }

    #[test]
    fn test_describe_command() {
        let cli =
            Cli::try_parse_from(["crondeck", "describe", "0 9 * * 1-5", "--locale", "zh_CN"])
                .unwrap();
        assert!(!cli.starts_server());
        assert_eq!(
            cli.command,
            Some(Commands::Describe {
                expression: "0 9 * * 1-5".to_string(),
                locale: Some(Locale::Zh),
            })
        );
    }

    #[test]
    fn test_list_rejects_unknown_locale() {
        assert!(Cli::try_parse_from(["crondeck", "list", "--locale", "fr"]).is_err());
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["crondeck", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
