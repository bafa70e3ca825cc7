//! Liveness endpoint.

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Name of the upstream data provider, reported by the health check
pub const UPSTREAM_API: &str = "Open-Meteo";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub api: String,
    /// RFC 3339
    pub timestamp: String,
}

/// `GET /api/health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Weather API is running".to_string(),
        api: UPSTREAM_API.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
