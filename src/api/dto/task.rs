//! Task-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::crontab::{AddOutcome, CronEntry, DeleteOutcome, ScriptType, UpdateOutcome};
use crate::schedule::{Locale, describe, validate_schedule};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[schema(example = json!({
    "schedule": "*/5 * * * *",
    "script_type": "shell",
    "content": "echo hi"
}))]
pub struct CreateTaskRequest {
    #[validate(custom(function = "validate_schedule"))]
    #[schema(example = "*/5 * * * *")]
    pub schedule: String,

    pub script_type: ScriptType,

    #[validate(length(max = 262144, message = "Script content must be at most 256 KiB"))]
    #[serde(default)]
    pub content: String,
}

/// Request body for replacing the task at an index.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateTaskRequest {
    #[validate(custom(function = "validate_schedule"))]
    #[schema(example = "0 9 * * 1-5")]
    pub schedule: String,

    pub script_type: ScriptType,

    #[validate(length(max = 262144, message = "Script content must be at most 256 KiB"))]
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// One crontab line with a readable description of its schedule.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskEntryResponse {
    #[serde(flatten)]
    pub entry: CronEntry,
    /// Present for task lines only
    #[schema(example = "At minute 0 of every hour")]
    pub description: Option<String>,
}

impl TaskEntryResponse {
    pub fn new(entry: CronEntry, locale: Locale) -> Self {
        let description = entry.task().map(|task| describe(&task.schedule, locale));
        Self { entry, description }
    }
}

/// Result of creating or updating a task.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskMutationResponse {
    pub index: usize,
    /// The crontab line that was installed
    pub line: String,
    /// The line it replaced, for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_line: Option<String>,
    pub script_type: ScriptType,
    pub script_path: String,
    pub log_path: String,
    pub warnings: Vec<String>,
}

impl From<AddOutcome> for TaskMutationResponse {
    fn from(outcome: AddOutcome) -> Self {
        Self {
            index: outcome.index,
            line: outcome.line,
            replaced_line: None,
            script_type: outcome.script.script_type,
            script_path: outcome.script.path.display().to_string(),
            log_path: outcome.script.log_path.display().to_string(),
            warnings: Vec::new(),
        }
    }
}

impl From<UpdateOutcome> for TaskMutationResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            index: outcome.index,
            line: outcome.line,
            replaced_line: Some(outcome.replaced_line),
            script_type: outcome.script.script_type,
            script_path: outcome.script.path.display().to_string(),
            log_path: outcome.script.log_path.display().to_string(),
            warnings: outcome.warnings,
        }
    }
}

/// Result of deleting a task.
///
/// Only scripts generated in this instance's scripts directory are removed.
/// When the deleted line ran any other script, that file is left in place
/// and reported in `warnings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTaskResponse {
    pub index: usize,
    pub removed_line: String,
    /// Script or log files that could not be removed
    pub warnings: Vec<String>,
}

impl From<DeleteOutcome> for DeleteTaskResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            index: outcome.index,
            removed_line: outcome.removed_line,
            warnings: outcome.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crontab::line;

    #[test]
    fn test_create_request_validation() {
        let ok: CreateTaskRequest = serde_json::from_str(
            r#"{"schedule":"*/5 * * * *","script_type":"shell","content":"echo hi"}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: CreateTaskRequest =
            serde_json::from_str(r#"{"schedule":"61 * * * *","script_type":"python"}"#).unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("schedule"));
    }

    #[test]
    fn test_unknown_script_type_is_rejected_on_deserialize() {
        let result = serde_json::from_str::<CreateTaskRequest>(
            r#"{"schedule":"* * * * *","script_type":"perl","content":""}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_response_describes_tasks_only() {
        let task = TaskEntryResponse::new(line::parse(0, "0 * * * * sh /x.sh"), Locale::En);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["index"], 0);
        assert_eq!(json["type"], "task");
        assert!(json["description"].is_string());

        let comment = TaskEntryResponse::new(line::parse(1, "# note"), Locale::En);
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["type"], "unmanaged");
        assert!(json["description"].is_null());
    }
}
