use std::path::PathBuf;

use thiserror::Error;

use crate::crontab::line::SCHEDULE_FIELDS;

/// Failures talking to the OS crontab reader/writer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("`{program}` exited with status {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error while talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulated store failure: {0}")]
    Injected(String),
}

/// Failures creating or reading generated script files.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to prepare scripts directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create script {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not allocate a unique script name in {dir} after {attempts} attempts")]
    NameExhausted { dir: PathBuf, attempts: u32 },

    #[error("Unknown script type: {0}")]
    UnknownType(String),
}

/// A schedule or command that cannot be written as a single cron line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("{part} must not contain line breaks")]
    LineBreak { part: &'static str },

    #[error("schedule must have {SCHEDULE_FIELDS} fields, found {found}")]
    FieldCount { found: usize },
}

/// Failures of a task-level operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading or writing the crontab failed. When the failed operation had
    /// already generated a script, its path is carried so the caller can
    /// decide whether to remove it.
    #[error("Crontab operation failed: {source}")]
    Store {
        #[source]
        source: StoreError,
        orphaned_script: Option<PathBuf>,
    },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("Invalid cron line: {0}")]
    InvalidLine(#[from] LineError),

    #[error("Task {index} not found (table has {len} entries)")]
    NotFound { index: usize, len: usize },

    #[error("Task {index} cannot be edited: {reason}")]
    NotEditable { index: usize, reason: String },
}

impl From<StoreError> for RegistryError {
    fn from(source: StoreError) -> Self {
        RegistryError::Store {
            source,
            orphaned_script: None,
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
