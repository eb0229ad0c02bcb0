//! Logging built on `tracing-subscriber`.
//!
//! Console output (ANSI only on a terminal) and an optional file output in
//! full, compact or JSON format with size-based rotation.

pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};
use writer::RotatingFileWriter;

/// Installs the global subscriber.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // The file layer goes first so console ANSI settings do not leak into it.
    let file_layer = if config.file.enabled {
        Some(file_layer(&config.file)?)
    } else {
        None
    };
    let console_layer = config.console.enabled.then(|| {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        fmt::layer()
            .with_ansi(use_ansi)
            .with_target(true)
            .with_level(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggerError::Init {
            message: e.to_string(),
        })?;

    Ok(())
}

fn file_layer<S>(config: &FileConfig) -> Result<Box<dyn Layer<S> + Send + Sync>, LoggerError>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = RotatingFileWriter::new(config)?;

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };
    Ok(layer)
}
