//! Service layer between the transport (HTTP, CLI) and the crontab core.

mod task_service;

pub use task_service::TaskService;

use std::sync::Arc;

use crate::config::Settings;
use crate::crontab::{RegistryError, RegistryOptions, ScheduleStore, ScriptManager, TaskRegistry};
use crate::error::AppResult;

/// Aggregates all services for use as Axum application state.
///
/// Cloning is cheap; services share their state through `Arc`.
#[derive(Clone)]
pub struct Services {
    pub tasks: TaskService,
}

impl Services {
    /// Wires the task registry to `store` and the configured scripts
    /// directory, creating the directory if needed.
    pub fn new(settings: &Settings, store: Arc<dyn ScheduleStore>) -> AppResult<Self> {
        let scripts = ScriptManager::from_config(&settings.scripts).map_err(RegistryError::from)?;
        let options = RegistryOptions {
            retain_previous_script_on_edit: settings.tasks.retain_previous_script_on_edit,
        };
        let registry = Arc::new(TaskRegistry::new(store, scripts, options));

        Ok(Self {
            tasks: TaskService::new(registry, &settings.tasks),
        })
    }
}
