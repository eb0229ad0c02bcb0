//! HTTP server lifecycle: state construction, binding and graceful shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, Settings};
use crate::crontab::{CrontabCommandStore, MemoryScheduleStore, ScheduleStore};
use crate::state::AppState;

/// Where the server reads and writes the schedule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// The OS crontab through the configured `crontab` program
    #[default]
    Crontab,
    /// A process-local table that starts empty and is lost on exit
    Memory,
}

pub struct Server {
    settings: Settings,
    backend: StoreBackend,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            backend: StoreBackend::default(),
            environment: Environment::from_env(),
        }
    }

    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Only reported in the startup log; settings are already loaded.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Runs until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - The scripts directory cannot be created
    /// - The address cannot be bound
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = self.settings.server.port,
            request_timeout = self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        tracing::info!(
            backend = ?self.backend,
            program = %self.settings.crontab.program,
            user = self.settings.crontab.user.as_deref().unwrap_or("<current>"),
            timeout_secs = self.settings.crontab.timeout_secs,
            scripts_dir = %self.settings.scripts.directory,
            retain_previous_script_on_edit = self.settings.tasks.retain_previous_script_on_edit,
            "Crontab configuration loaded"
        );

        let store: Arc<dyn ScheduleStore> = match self.backend {
            StoreBackend::Crontab => Arc::new(CrontabCommandStore::from_config(&self.settings.crontab)),
            StoreBackend::Memory => {
                tracing::warn!("Serving an in-memory crontab; changes are not installed");
                Arc::new(MemoryScheduleStore::new())
            }
        };

        let address = self.settings.server.address();
        let state = AppState::new(self.settings, store)
            .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {e}"))?;
        let router = create_router(state);

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {address}: {e}")
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and treated as never firing.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
