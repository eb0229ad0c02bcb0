//! Task-level operations over the crontab and its generated scripts.
//!
//! Every mutation is one read-modify-write cycle of the whole table:
//! load the snapshot, change the in-memory list, install the list. Cycles are
//! serialized through `write_lock`, so requests served by this process cannot
//! lose each other's updates. Edits made to the crontab by other processes
//! are not detected; the later whole-table write wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::crontab::error::{RegistryError, RegistryResult};
use crate::crontab::line::{self, CronEntry, Task};
use crate::crontab::metadata;
use crate::crontab::script::{CreatedScript, ScriptManager, ScriptType};
use crate::crontab::store::ScheduleStore;

/// Result of an index-addressed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    Applied(T),
    /// The index was outside the snapshot; nothing was written.
    OutOfRange { index: usize, len: usize },
}

impl<T> MutationOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            MutationOutcome::Applied(value) => Some(value),
            MutationOutcome::OutOfRange { .. } => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub index: usize,
    pub line: String,
    pub script: CreatedScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub index: usize,
    pub line: String,
    pub replaced_line: String,
    pub script: CreatedScript,
    /// Problems removing the previous script when it is not retained.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub index: usize,
    pub removed_line: String,
    /// Script/log cleanup problems; the line itself was removed.
    pub warnings: Vec<String>,
}

/// What an edit form needs to show for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskEditView {
    pub index: usize,
    pub schedule: String,
    pub script_type: ScriptType,
    pub content: String,
    #[schema(value_type = String)]
    pub script_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Keep the old script file when a task is edited.
    pub retain_previous_script_on_edit: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            retain_previous_script_on_edit: true,
        }
    }
}

/// Guesses the script type from a command's text.
///
/// Only reliable for commands produced by [`ScriptManager::create`].
pub fn infer_script_type(command: &str) -> ScriptType {
    if command.starts_with("python ") {
        ScriptType::Python
    } else {
        ScriptType::Shell
    }
}

pub struct TaskRegistry {
    store: Arc<dyn ScheduleStore>,
    scripts: ScriptManager,
    options: RegistryOptions,
    write_lock: Mutex<()>,
}

impl TaskRegistry {
    pub fn new(store: Arc<dyn ScheduleStore>, scripts: ScriptManager, options: RegistryOptions) -> Self {
        Self {
            store,
            scripts,
            options,
            write_lock: Mutex::new(()),
        }
    }

    pub fn scripts(&self) -> &ScriptManager {
        &self.scripts
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Current snapshot, one entry per crontab line.
    pub async fn list(&self) -> RegistryResult<Vec<CronEntry>> {
        let lines = self.store.read_lines().await?;
        let mut entries = line::parse_all(&lines);
        for entry in &mut entries {
            if let Some(task) = entry.task_mut() {
                self.annotate(task);
            }
        }
        Ok(entries)
    }

    pub async fn get(&self, index: usize) -> RegistryResult<CronEntry> {
        let entries = self.list().await?;
        let len = entries.len();
        entries
            .into_iter()
            .nth(index)
            .ok_or(RegistryError::NotFound { index, len })
    }

    /// Creates a script and appends its line as the last task.
    pub async fn add(
        &self,
        schedule: &str,
        script_type: ScriptType,
        content: &str,
    ) -> RegistryResult<AddOutcome> {
        let schedule = line::normalize_schedule(schedule)?;
        let _guard = self.write_lock.lock().await;

        let mut lines = self.store.read_lines().await?;
        let script = self.scripts.create(script_type, content)?;
        let line = self.line_for(&schedule, &script)?;
        lines.push(line.clone());
        let index = lines.len() - 1;

        self.install(&lines, Some(&script.path)).await?;
        tracing::info!(index, line = %line, "Task added");

        Ok(AddOutcome {
            index,
            line,
            script,
        })
    }

    /// Replaces the task at `index` with a freshly generated script.
    pub async fn update(
        &self,
        index: usize,
        schedule: &str,
        script_type: ScriptType,
        content: &str,
    ) -> RegistryResult<MutationOutcome<UpdateOutcome>> {
        let schedule = line::normalize_schedule(schedule)?;
        let _guard = self.write_lock.lock().await;

        let mut lines = self.store.read_lines().await?;
        if index >= lines.len() {
            tracing::debug!(index, len = lines.len(), "Update index out of range");
            return Ok(MutationOutcome::OutOfRange {
                index,
                len: lines.len(),
            });
        }

        let previous = line::parse(index, &lines[index]);
        let script = self.scripts.create(script_type, content)?;
        let line = self.line_for(&schedule, &script)?;
        let replaced_line = std::mem::replace(&mut lines[index], line.clone());

        self.install(&lines, Some(&script.path)).await?;
        tracing::info!(index, line = %line, "Task updated");

        let mut warnings = Vec::new();
        if !self.options.retain_previous_script_on_edit {
            let old_script = previous
                .task()
                .and_then(Task::script_path)
                .map(Path::new)
                .filter(|path| self.scripts.is_managed(path));
            if let Some(old_script) = old_script {
                warnings = self.scripts.delete(old_script);
            }
        }

        Ok(MutationOutcome::Applied(UpdateOutcome {
            index,
            line,
            replaced_line,
            script,
            warnings,
        }))
    }

    /// Removes the line at `index`, then its script and log file.
    ///
    /// The reduced table is installed before any file is touched, so a failed
    /// write never leaves a line pointing at a deleted script.
    pub async fn delete(&self, index: usize) -> RegistryResult<MutationOutcome<DeleteOutcome>> {
        let _guard = self.write_lock.lock().await;

        let mut lines = self.store.read_lines().await?;
        if index >= lines.len() {
            tracing::debug!(index, len = lines.len(), "Delete index out of range");
            return Ok(MutationOutcome::OutOfRange {
                index,
                len: lines.len(),
            });
        }

        let removed = line::parse(index, &lines[index]);
        let removed_line = lines.remove(index);
        self.install(&lines, None).await?;
        tracing::info!(index, line = %removed_line, "Task deleted");

        let warnings = removed
            .task()
            .and_then(Task::script_path)
            .map(|path| self.scripts.delete(Path::new(path)))
            .unwrap_or_default();

        Ok(MutationOutcome::Applied(DeleteOutcome {
            index,
            removed_line,
            warnings,
        }))
    }

    /// Loads what an edit form needs for the task at `index`.
    pub async fn edit_view(&self, index: usize) -> RegistryResult<TaskEditView> {
        let entry = self.get(index).await?;

        let task = entry.task().ok_or_else(|| RegistryError::NotEditable {
            index,
            reason: "line is not a schedule + command entry".to_string(),
        })?;
        let command = task.command.as_deref().ok_or_else(|| RegistryError::NotEditable {
            index,
            reason: "line has no command".to_string(),
        })?;
        let script_path = task.script_path().ok_or_else(|| RegistryError::NotEditable {
            index,
            reason: "command does not reference a script".to_string(),
        })?;
        let script_path = PathBuf::from(script_path);

        Ok(TaskEditView {
            index,
            schedule: task.schedule.clone(),
            script_type: self.script_type_of(command, &script_path),
            content: self.content_of(&script_path),
            script_path,
        })
    }

    /// Only generated scripts are read; any other path the command names is
    /// not served back to clients.
    fn content_of(&self, script_path: &Path) -> String {
        if self.scripts.is_managed(script_path) {
            self.scripts.read_content(script_path)
        } else {
            format!(
                "# {} is not a generated script; content not shown",
                script_path.display()
            )
        }
    }

    /// Script type from the sidecar record, falling back to the command text.
    pub fn script_type_of(&self, command: &str, script_path: &Path) -> ScriptType {
        metadata::read(script_path)
            .map(|record| record.script_type)
            .unwrap_or_else(|| infer_script_type(command))
    }

    fn annotate(&self, task: &mut Task) {
        task.log_path = task
            .script_path()
            .map(Path::new)
            .filter(|path| self.scripts.is_managed(path))
            .map(|path| self.scripts.log_path_for(path));
    }

    /// Serializes the line for a freshly created script, removing the
    /// script again when the line would be rejected.
    fn line_for(&self, schedule: &str, script: &CreatedScript) -> RegistryResult<String> {
        line::serialize(schedule, &script.command).map_err(|e| {
            tracing::warn!(script = %script.path.display(), error = %e, "Rejected cron line");
            self.scripts.delete(&script.path);
            RegistryError::InvalidLine(e)
        })
    }

    async fn install(&self, lines: &[String], created: Option<&Path>) -> RegistryResult<()> {
        self.store.write_lines(lines).await.map_err(|source| {
            tracing::error!(error = %source, "Crontab write failed, change discarded");
            RegistryError::Store {
                source,
                orphaned_script: created.map(Path::to_path_buf),
            }
        })
    }
}
