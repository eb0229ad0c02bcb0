//! Converts `AppError` and bare error statuses into `ErrorResponse` bodies.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Error bodies larger than this are replaced rather than rewritten.
const MAX_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - NotFound → 404
    /// - Validation, ValidationErrors, BadRequest → 400
    /// - UnprocessableContent → 422
    /// - Crontab → 502
    /// - Configuration, Internal → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let error_response = match &self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::not_found_error(entity, field, value),
            AppError::Validation { field, reason } => {
                ErrorResponse::validation_error(field, reason)
            }
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(error_to_code(&self), "Request validation failed")
                    .with_details(json!({ "errors": errors }))
            }
            AppError::BadRequest { message } | AppError::UnprocessableContent { message } => {
                ErrorResponse::new(error_to_code(&self), message)
            }
            AppError::Crontab { operation, source } => {
                tracing::error!(operation = %operation, error = %source, "Crontab operation failed");
                ErrorResponse::new(error_to_code(&self), &format!("{operation} failed"))
                    .with_details(json!({ "error": source.to_string() }))
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = %source, "Configuration error");
                ErrorResponse::new(error_to_code(&self), &format!("Configuration error: {key}"))
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                ErrorResponse::new(error_to_code(&self), "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Gives every 4xx/5xx response an `ErrorResponse` body carrying the request
/// ID. Responses produced outside the handlers (unknown route, wrong method,
/// timeout) arrive with plain or empty bodies and are rewritten here.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_ERROR_BODY).await.unwrap_or_default();

    let mut error_response = if is_json {
        match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(parsed) => parsed,
            Err(_) => return Response::from_parts(parts, Body::from(bytes)),
        }
    } else {
        let original = String::from_utf8_lossy(&bytes).trim().to_string();
        fallback_response(status, original)
    };

    if let Some(RequestId(id)) = request_id {
        error_response = error_response.with_request_id(&id);
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    let mut rewritten = Json(error_response).into_response();
    *rewritten.status_mut() = status;
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE {
            rewritten.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rewritten
}

fn fallback_response(status: StatusCode, original: String) -> ErrorResponse {
    let (code, default_message) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::INTERNAL_SERVER_ERROR => {
            ("INTERNAL_SERVER_ERROR", "An internal server error occurred")
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    let message = if original.is_empty() {
        default_message.to_string()
    } else {
        original
    };
    ErrorResponse::new(code, &message)
}

pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::UnprocessableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Crontab { .. } => StatusCode::BAD_GATEWAY,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::UnprocessableContent { .. } => "UNPROCESSABLE_CONTENT",
        AppError::Crontab { .. } => "CRONTAB_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFieldError;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            error_to_status_code(&AppError::task_not_found(3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&AppError::UnprocessableContent {
                message: "x".into()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let crontab = AppError::Crontab {
            operation: "install crontab".into(),
            source: anyhow::anyhow!("exit 1"),
        };
        assert_eq!(error_to_status_code(&crontab), StatusCode::BAD_GATEWAY);
        assert_eq!(error_to_code(&crontab), "CRONTAB_ERROR");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = AppError::task_not_found(3).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "task with index=3 not found");
    }

    #[tokio::test]
    async fn test_validation_errors_body_lists_fields() {
        let response = AppError::ValidationErrors {
            errors: vec![ValidationFieldError {
                field: "schedule".into(),
                message: "Expected 5 fields, found 1".into(),
            }],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["details"]["errors"][0]["field"], "schedule");
    }

    #[tokio::test]
    async fn test_internal_error_is_sanitized() {
        let response = AppError::Internal {
            source: anyhow::anyhow!("secret path /etc/shadow"),
        }
        .into_response();
        let json = body_json(response).await;
        assert_eq!(json["message"], "An internal error occurred");
        assert!(!json.to_string().contains("shadow"));
    }

    fn app() -> Router {
        Router::new()
            .route("/plain", get(|| async { (StatusCode::BAD_REQUEST, "bad input") }))
            .route(
                "/typed",
                get(|| async { AppError::task_not_found(1).into_response() }),
            )
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(
                |mut request: Request, next: Next| async move {
                    request
                        .extensions_mut()
                        .insert(RequestId("req-42".to_string()));
                    next.run(request).await
                },
            ))
    }

    #[tokio::test]
    async fn test_global_handler_rewrites_plain_errors() {
        let response = app()
            .oneshot(Request::get("/plain").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "bad input");
        assert_eq!(json["request_id"], "req-42");
    }

    #[tokio::test]
    async fn test_global_handler_stamps_request_id_on_json_errors() {
        let response = app()
            .oneshot(Request::get("/typed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["request_id"], "req-42");
    }

    #[tokio::test]
    async fn test_global_handler_covers_unknown_routes() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
