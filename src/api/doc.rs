use utoipa::OpenApi;

pub const TASK_TAG: &str = "Tasks";
pub const SCHEDULE_TAG: &str = "Schedules";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "crondeck",
        description = "Manage crontab entries and the scripts they run",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
            crate::crontab::ScriptType,
            crate::crontab::UnmanagedReason,
        )
    ),
    tags(
        (name = TASK_TAG, description = "Crontab task endpoints"),
        (name = SCHEDULE_TAG, description = "Schedule presets and descriptions"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
