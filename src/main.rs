use clap::Parser;

use crondeck::cli::{self, Cli, CommandOutcome};
use crondeck::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, environment) = cli::load_and_merge_config(&cli)?;

    // One-shot commands print to stdout; only the server installs a subscriber.
    if cli.starts_server() {
        cli::init_logger_from_settings(&settings)?;
    }

    match cli::execute_command(&cli, settings.clone()).await? {
        CommandOutcome::StartServer(backend) => {
            Server::new(settings)
                .with_backend(backend)
                .with_environment(environment)
                .run()
                .await
        }
        CommandOutcome::Completed => Ok(()),
    }
}
