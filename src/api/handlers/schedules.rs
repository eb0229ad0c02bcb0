//! Schedule preset and description handlers.

use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::SCHEDULE_TAG;
use crate::api::dto::{DescribeQuery, DescribeResponse, ErrorResponse, locale_of};
use crate::error::AppResult;
use crate::schedule::{self, CronSchedule, Preset};
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;

pub fn schedule_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_presets))
        .routes(routes!(describe_schedule))
}

/// GET /api/schedules/presets - Labelled schedule shortcuts
#[utoipa::path(
    get,
    path = "/presets",
    tag = SCHEDULE_TAG,
    responses(
        (status = 200, description = "Preset catalog in display order", body = Vec<Preset>)
    )
)]
async fn list_presets() -> Json<Vec<Preset>> {
    Json(schedule::presets().to_vec())
}

/// GET /api/schedules/describe - Describe a cron expression
///
/// Always answers 200; an unparseable expression yields the localized
/// fallback text with `valid = false`.
#[utoipa::path(
    get,
    path = "/describe",
    tag = SCHEDULE_TAG,
    params(DescribeQuery),
    responses(
        (status = 200, description = "Description or fallback text", body = DescribeResponse),
        (status = 400, description = "Missing expression", body = ErrorResponse)
    )
)]
async fn describe_schedule(
    ValidatedQuery(query): ValidatedQuery<DescribeQuery>,
) -> AppResult<Json<DescribeResponse>> {
    let locale = locale_of(query.locale.as_deref());
    let valid = CronSchedule::parse(&query.expression).is_ok();
    let description = schedule::describe(&query.expression, locale);

    Ok(Json(DescribeResponse {
        expression: query.expression,
        locale,
        description,
        valid,
    }))
}
