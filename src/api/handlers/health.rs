//! Health check endpoint handlers.
//!
//! Readiness means the crontab can be read; liveness only means the process
//! answers.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// - `GET /` - full health report
/// - `GET /live` - liveness probe
/// - `GET /ready` - readiness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(liveness_check))
        .routes(routes!(readiness_check))
}

/// GET /api/health - Health report including crontab access
#[utoipa::path(
    get,
    path = "/",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let crontab = check_crontab(&state).await;
    let status = crontab.status;

    let mut checks = BTreeMap::new();
    checks.insert("crontab".to_string(), crontab);

    let response = HealthResponse {
        status,
        version: state.settings.application.version.clone(),
        timestamp: jiff::Timestamp::now().to_string(),
        checks,
    };

    let code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

/// GET /api/health/live - Liveness probe
#[utoipa::path(
    get,
    path = "/live",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is alive")
    )
)]
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// GET /api/health/ready - Readiness probe
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Crontab cannot be read")
    )
)]
async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_crontab(&state).await.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    }
}

async fn check_crontab(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let result = state.services.tasks.check_crontab().await;
    let response_time_ms = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(lines) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some(format!("{lines} lines installed")),
            response_time_ms,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Crontab health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
                response_time_ms,
            }
        }
    }
}
