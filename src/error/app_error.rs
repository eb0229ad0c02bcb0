use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::ConfigError;
use crate::crontab::{LineError, RegistryError, ScriptError};

/// Application-wide error type returned by services and handlers.
///
/// Module errors (`RegistryError`, `ConfigError`, request rejections) are
/// converted into the variant that decides the HTTP status; see
/// `api::middleware::error_handler` for the mapping.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Field errors collected by `validator`
    #[error("Validation failed for {} field(s)", errors.len())]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unprocessable content: {message}")]
    UnprocessableContent { message: String },

    /// The crontab reader or writer failed
    #[error("Crontab operation failed: {operation}")]
    Crontab {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

/// One failed field of a validated request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    pub fn task_not_found(index: usize) -> Self {
        AppError::NotFound {
            entity: "task".to_string(),
            field: "index".to_string(),
            value: index.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<RegistryError> for AppError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound { index, .. } => AppError::task_not_found(index),
            RegistryError::NotEditable { index, reason } => AppError::UnprocessableContent {
                message: format!("Task {index} cannot be edited: {reason}"),
            },
            RegistryError::Store { source, .. } => AppError::Crontab {
                operation: "crontab read/write".to_string(),
                source: source.into(),
            },
            RegistryError::Script(ScriptError::UnknownType(name)) => AppError::Validation {
                field: "script_type".to_string(),
                reason: format!("Unknown script type '{name}'"),
            },
            RegistryError::InvalidLine(error) => AppError::Validation {
                field: match &error {
                    LineError::LineBreak { part } => part.to_string(),
                    LineError::FieldCount { .. } => "schedule".to_string(),
                },
                reason: error.to_string(),
            },
            RegistryError::Script(source) => AppError::Internal {
                source: source.into(),
            },
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: error.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationFieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
