//! Dispatch of parsed CLI commands after configuration loading.

use std::sync::Arc;

use super::handlers::{
    DescribeCommandHandler, ListCommandHandler, PresetsCommandHandler, ServeCommandHandler,
};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::crontab::CrontabCommandStore;
use crate::error::AppResult;
use crate::server::StoreBackend;

/// What `main` should do once a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Start the HTTP server against this backend
    StartServer(StoreBackend),
    /// The command finished; exit
    Completed,
}

/// Runs one-shot commands; `serve` without `--dry-run` is returned to the
/// caller as [`CommandOutcome::StartServer`].
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<CommandOutcome> {
    validate_command_args(cli);

    match &cli.command {
        None => Ok(CommandOutcome::StartServer(StoreBackend::Crontab)),
        Some(Commands::Serve {
            dry_run: true, ..
        }) => {
            ServeCommandHandler::new(settings).validate_only()?;
            Ok(CommandOutcome::Completed)
        }
        Some(Commands::Serve { in_memory, .. }) => {
            let backend = if *in_memory {
                StoreBackend::Memory
            } else {
                StoreBackend::Crontab
            };
            Ok(CommandOutcome::StartServer(backend))
        }
        Some(Commands::List { locale, json }) => {
            let store = Arc::new(CrontabCommandStore::from_config(&settings.crontab));
            ListCommandHandler::new(&settings, store)?
                .execute(locale.unwrap_or_default(), *json)
                .await?;
            Ok(CommandOutcome::Completed)
        }
        Some(Commands::Describe { expression, locale }) => {
            DescribeCommandHandler::execute(expression, locale.unwrap_or_default())?;
            Ok(CommandOutcome::Completed)
        }
        Some(Commands::Presets { json }) => {
            PresetsCommandHandler::execute(*json)?;
            Ok(CommandOutcome::Completed)
        }
    }
}

/// Prints warnings for argument combinations that are allowed but unusual.
fn validate_command_args(cli: &Cli) {
    if let Some(Commands::Serve {
        host: Some(host),
        port: Some(port),
        ..
    }) = &cli.command
    {
        validate_serve_args(host, *port);
    }
}

fn validate_serve_args(host: &str, port: u16) {
    if port < 1024 && host == "0.0.0.0" {
        eprintln!("Warning: Binding to 0.0.0.0 on port {port} requires root privileges");
    }
}
