//! Per-request tracing span with timing.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, Level, info, span, warn};

use super::RequestId;

/// Logs method, path and request ID on the way in, status and duration on
/// the way out. Server errors are logged at warn.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = span!(
        Level::INFO,
        "http_request",
        method = %method,
        uri = %uri,
        request_id = %request_id
    );

    async move {
        info!(method = %method, path = %uri.path(), "Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        if response.status().is_server_error() {
            warn!(status, duration_ms, "Response sent");
        } else {
            info!(status, duration_ms, "Response sent");
        }

        response
    }
    .instrument(span)
    .await
}
