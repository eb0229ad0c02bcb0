//! Task service: the business layer over [`TaskRegistry`].
//!
//! Handlers and CLI commands go through this service. It turns registry
//! outcomes into `AppResult`s and removes scripts orphaned by a failed
//! crontab write when configured to.

use std::path::Path;
use std::sync::Arc;

use crate::config::TasksConfig;
use crate::crontab::{
    AddOutcome, CronEntry, DeleteOutcome, MutationOutcome, RegistryError, RegistryResult,
    ScriptType, TaskEditView, TaskRegistry, UpdateOutcome,
};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct TaskService {
    registry: Arc<TaskRegistry>,
    cleanup_orphaned_scripts: bool,
}

impl TaskService {
    pub fn new(registry: Arc<TaskRegistry>, config: &TasksConfig) -> Self {
        Self {
            registry,
            cleanup_orphaned_scripts: config.cleanup_orphaned_scripts,
        }
    }

    /// Lists every line of the current crontab, managed or not.
    pub async fn list_tasks(&self) -> AppResult<Vec<CronEntry>> {
        Ok(self.registry.list().await?)
    }

    pub async fn get_task(&self, index: usize) -> AppResult<CronEntry> {
        Ok(self.registry.get(index).await?)
    }

    pub async fn edit_view(&self, index: usize) -> AppResult<TaskEditView> {
        Ok(self.registry.edit_view(index).await?)
    }

    /// Creates a script for `content` and appends a task running it.
    pub async fn create_task(
        &self,
        schedule: &str,
        script_type: ScriptType,
        content: &str,
    ) -> AppResult<AddOutcome> {
        let result = self.registry.add(schedule, script_type, content).await;
        self.settle(result)
    }

    /// Replaces the task at `index`.
    ///
    /// # Returns
    /// `NotFound` when `index` is outside the current crontab; nothing is
    /// written in that case.
    pub async fn update_task(
        &self,
        index: usize,
        schedule: &str,
        script_type: ScriptType,
        content: &str,
    ) -> AppResult<UpdateOutcome> {
        let result = self
            .registry
            .update(index, schedule, script_type, content)
            .await;
        match self.settle(result)? {
            MutationOutcome::Applied(outcome) => Ok(outcome),
            MutationOutcome::OutOfRange { index, .. } => Err(AppError::task_not_found(index)),
        }
    }

    pub async fn delete_task(&self, index: usize) -> AppResult<DeleteOutcome> {
        match self.registry.delete(index).await? {
            MutationOutcome::Applied(outcome) => {
                for warning in &outcome.warnings {
                    tracing::warn!(index, warning = %warning, "Task deleted with cleanup warning");
                }
                Ok(outcome)
            }
            MutationOutcome::OutOfRange { index, .. } => Err(AppError::task_not_found(index)),
        }
    }

    /// Number of crontab lines; fails when the crontab cannot be read.
    pub async fn check_crontab(&self) -> AppResult<usize> {
        Ok(self.registry.list().await?.len())
    }

    fn settle<T>(&self, result: RegistryResult<T>) -> AppResult<T> {
        if let Err(RegistryError::Store {
            orphaned_script: Some(path),
            ..
        }) = &result
        {
            self.handle_orphan(path);
        }
        Ok(result?)
    }

    fn handle_orphan(&self, path: &Path) {
        if !self.cleanup_orphaned_scripts {
            tracing::warn!(script = %path.display(), "Crontab write failed; generated script left in place");
            return;
        }

        let warnings = self.registry.scripts().delete(path);
        if warnings.is_empty() {
            tracing::info!(script = %path.display(), "Removed script orphaned by failed crontab write");
        }
        for warning in warnings {
            tracing::warn!(script = %path.display(), warning = %warning, "Orphaned script cleanup incomplete");
        }
    }
}
