//! Health check endpoint.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Liveness check.
///
/// Returns 200 OK if the service is running. The payment provider is not
/// contacted.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
