//! Health check DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2026-01-01T12:00:00Z",
    "checks": {
        "crontab": {
            "status": "healthy",
            "message": "3 lines installed",
            "response_time_ms": 4
        }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// RFC 3339 timestamp of the check
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}
