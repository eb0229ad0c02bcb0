//! Crontab task request handlers.
//!
//! Tasks are addressed by their position in the crontab as read at request
//! time. An index outside the table answers 404 and writes nothing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::TASK_TAG;
use crate::api::dto::{
    CreateTaskRequest, DeleteTaskResponse, ErrorResponse, TaskEntryResponse, TaskListQuery,
    TaskMutationResponse, UpdateTaskRequest, locale_of,
};
use crate::crontab::TaskEditView;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

pub fn task_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_tasks))
        .routes(routes!(create_task))
        .routes(routes!(get_task))
        .routes(routes!(update_task))
        .routes(routes!(delete_task))
        .routes(routes!(edit_task))
}

/// GET /api/tasks - List every crontab line
#[utoipa::path(
    get,
    path = "/",
    tag = TASK_TAG,
    params(TaskListQuery),
    responses(
        (status = 200, description = "Crontab lines in table order", body = Vec<TaskEntryResponse>),
        (status = 502, description = "Crontab could not be read", body = ErrorResponse)
    )
)]
async fn list_tasks(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TaskListQuery>,
) -> AppResult<Json<Vec<TaskEntryResponse>>> {
    let locale = locale_of(query.locale.as_deref());
    let entries = state.services.tasks.list_tasks().await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|entry| TaskEntryResponse::new(entry, locale))
            .collect(),
    ))
}

/// POST /api/tasks - Create a script and append a task running it
#[utoipa::path(
    post,
    path = "/",
    tag = TASK_TAG,
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskMutationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Crontab could not be written", body = ErrorResponse)
    )
)]
async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<TaskMutationResponse>)> {
    let outcome = state
        .services
        .tasks
        .create_task(&req.schedule, req.script_type, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /api/tasks/{index} - Get one crontab line
#[utoipa::path(
    get,
    path = "/{index}",
    tag = TASK_TAG,
    params(
        ("index" = usize, Path, description = "Zero-based position in the crontab"),
        TaskListQuery
    ),
    responses(
        (status = 200, description = "Line found", body = TaskEntryResponse),
        (status = 404, description = "No line at this index", body = ErrorResponse)
    )
)]
async fn get_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    ValidatedQuery(query): ValidatedQuery<TaskListQuery>,
) -> AppResult<Json<TaskEntryResponse>> {
    let entry = state.services.tasks.get_task(index).await?;
    Ok(Json(TaskEntryResponse::new(
        entry,
        locale_of(query.locale.as_deref()),
    )))
}

/// GET /api/tasks/{index}/edit - Schedule, script type and script body
#[utoipa::path(
    get,
    path = "/{index}/edit",
    tag = TASK_TAG,
    params(
        ("index" = usize, Path, description = "Zero-based position in the crontab")
    ),
    responses(
        (status = 200, description = "Edit view", body = TaskEditView),
        (status = 404, description = "No line at this index", body = ErrorResponse),
        (status = 422, description = "Line does not reference a script", body = ErrorResponse)
    )
)]
async fn edit_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> AppResult<Json<TaskEditView>> {
    Ok(Json(state.services.tasks.edit_view(index).await?))
}

/// PUT /api/tasks/{index} - Replace a task with a newly generated script
#[utoipa::path(
    put,
    path = "/{index}",
    tag = TASK_TAG,
    params(
        ("index" = usize, Path, description = "Zero-based position in the crontab")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task replaced", body = TaskMutationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No line at this index", body = ErrorResponse),
        (status = 502, description = "Crontab could not be written", body = ErrorResponse)
    )
)]
async fn update_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> AppResult<Json<TaskMutationResponse>> {
    let outcome = state
        .services
        .tasks
        .update_task(index, &req.schedule, req.script_type, &req.content)
        .await?;
    Ok(Json(outcome.into()))
}

/// DELETE /api/tasks/{index} - Remove a line and its script
#[utoipa::path(
    delete,
    path = "/{index}",
    tag = TASK_TAG,
    params(
        ("index" = usize, Path, description = "Zero-based position in the crontab")
    ),
    responses(
        (status = 200, description = "Line removed; warnings list cleanup problems", body = DeleteTaskResponse),
        (status = 404, description = "No line at this index", body = ErrorResponse),
        (status = 502, description = "Crontab could not be written", body = ErrorResponse)
    )
)]
async fn delete_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> AppResult<Json<DeleteTaskResponse>> {
    let outcome = state.services.tasks.delete_task(index).await?;
    Ok(Json(outcome.into()))
}
