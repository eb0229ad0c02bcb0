//! Router configuration for the API.

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Builds the application router.
///
/// # Middleware order (outermost first)
/// 1. request ID
/// 2. logging
/// 3. error body normalization
/// 4. CORS
/// 5. request timeout
///
/// # Routes
/// - `/api/tasks` - crontab tasks
/// - `/api/schedules` - presets and descriptions
/// - `/api/health` - health probes
/// - `/swagger-ui` - API documentation
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.settings.server.request_timeout);

    let (api_router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/tasks", handlers::tasks::task_routes())
        .nest("/api/schedules", handlers::schedules::schedule_routes())
        .nest("/api/health", handlers::health::health_routes())
        .split_for_parts();

    api_router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::REQUEST_ID_HEADER;
    use crate::config::Settings;
    use crate::crontab::MemoryScheduleStore;

    struct TestApp {
        router: Router,
        store: Arc<MemoryScheduleStore>,
        scripts: TempDir,
    }

    fn test_app(table: &str) -> TestApp {
        let scripts = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.scripts.directory = scripts.path().display().to_string();

        let store = Arc::new(MemoryScheduleStore::with_table(table));
        let state = AppState::new(settings, store.clone()).unwrap();
        TestApp {
            router: create_router(state),
            store,
            scripts,
        }
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let app = test_app("");

        let (status, created) = send(
            &app,
            with_json(
                "POST",
                "/api/tasks",
                json!({"schedule": "*/5 * * * *", "script_type": "shell", "content": "echo hi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["index"], 0);
        assert!(created["line"].as_str().unwrap().starts_with("*/5 * * * * sh "));

        let (status, listed) = send(&app, get("/api/tasks?locale=en")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["type"], "task");
        assert_eq!(listed[0]["schedule"], "*/5 * * * *");
        assert!(listed[0]["description"].is_string());

        let (status, edit) = send(&app, get("/api/tasks/0/edit")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edit["script_type"], "shell");
        assert!(edit["content"].as_str().unwrap().contains("echo hi"));

        let (status, updated) = send(
            &app,
            with_json(
                "PUT",
                "/api/tasks/0",
                json!({"schedule": "0 9 * * 1-5", "script_type": "python", "content": "print(1)"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["replaced_line"], created["line"]);
        assert!(updated["line"].as_str().unwrap().starts_with("0 9 * * 1-5 python "));

        let (status, deleted) = send(
            &app,
            Request::delete("/api/tasks/0").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["removed_line"], updated["line"]);
        assert_eq!(app.store.snapshot(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_not_found_and_writes_nothing() {
        let app = test_app("0 0 * * * sh /opt/backup.sh\n");

        let (status, body) = send(&app, get("/api/tasks/5")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send(
            &app,
            Request::delete("/api/tasks/1").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unmanaged_lines_keep_their_index() {
        let app = test_app("# header\nMAILTO=ops\n@reboot /usr/bin/true\n*/10 * * * *\n");

        let (_, listed) = send(&app, get("/api/tasks")).await;
        let kinds: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, ["unmanaged", "unmanaged", "unmanaged", "task"]);
        assert_eq!(listed[3]["index"], 3);
        assert!(listed[0]["description"].is_null());

        let (status, _) = send(&app, get("/api/tasks/0/edit")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected_with_request_id() {
        let app = test_app("");

        let request = Request::post("/api/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, "trace-me")
            .body(Body::from(
                json!({"schedule": "* * *", "script_type": "shell", "content": ""}).to_string(),
            ))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["request_id"], "trace-me");
        assert_eq!(body["details"]["errors"][0]["field"], "schedule");
        assert_eq!(app.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_schedule_with_line_break_installs_nothing() {
        let app = test_app("0 6 * * * sh /opt/a.sh\n");

        for (method, uri) in [("POST", "/api/tasks"), ("PUT", "/api/tasks/0")] {
            let (status, body) = send(
                &app,
                with_json(
                    method,
                    uri,
                    json!({"schedule": "0 0 * *\n*", "script_type": "shell", "content": "echo hi"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(body["details"]["errors"][0]["field"], "schedule");
        }

        assert_eq!(app.store.write_count(), 0);
        assert_eq!(app.store.snapshot(), vec!["0 6 * * * sh /opt/a.sh"]);
        assert_eq!(std::fs::read_dir(app.scripts.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_crontab_write_failure_is_bad_gateway() {
        let app = test_app("");
        app.store.fail_writes_with("crontab: installing new crontab failed");

        let (status, body) = send(
            &app,
            with_json(
                "POST",
                "/api/tasks",
                json!({"schedule": "* * * * *", "script_type": "shell", "content": "true"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "CRONTAB_ERROR");

        let leftovers = std::fs::read_dir(app.scripts.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_schedule_endpoints() {
        let app = test_app("");

        let (status, presets) = send(&app, get("/api/schedules/presets")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            presets
                .as_array()
                .unwrap()
                .iter()
                .any(|preset| preset["expression"] == "0 9 * * 1-5")
        );

        let (status, described) = send(
            &app,
            get("/api/schedules/describe?expression=0%209%20*%20*%201-5&locale=zh_CN"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(described["valid"], true);
        assert_eq!(described["locale"], "zh");

        let (status, invalid) =
            send(&app, get("/api/schedules/describe?expression=nonsense")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(invalid["valid"], false);
        assert_eq!(invalid["description"], "Invalid expression");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app("* * * * * true\n");

        let (status, report) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["checks"]["crontab"]["status"], "healthy");

        let (status, _) = send(&app, get("/api/health/live")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, get("/api/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
