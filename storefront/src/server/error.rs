//! Error types for HTTP handlers.
//!
//! Bridges validation errors, malformed request bodies and order failures
//! to HTTP responses by implementing Axum's `IntoResponse`.

use crate::orchestrator::{FailureKind, OrderFailure};
use crate::validation::ValidationError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Application error type for HTTP handlers.
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let buyer = request.buyer.validate()?;
///     Ok(Json(data))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 408 Request Timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            message.into(),
            "TIMEOUT".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always `false`
    success: bool,
    /// Error code (for client error handling)
    code: String,
    /// Human-readable error message
    error: String,
    /// HTTP status code
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Request failed"
            );
        }

        let body = ErrorResponse {
            success: false,
            code: self.code,
            error: self.message,
            status: self.status.as_u16(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

/// Unreadable or mistyped request bodies get the same JSON error shape as
/// every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<OrderFailure> for AppError {
    fn from(failure: OrderFailure) -> Self {
        match failure.kind {
            FailureKind::Configuration => Self::unavailable(failure.error),
            FailureKind::Authentication => Self::unauthorized(failure.error),
            FailureKind::Timeout => Self::timeout(failure.error),
            FailureKind::Processing => {
                let status = failure
                    .status_code
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .filter(|status| status.is_client_error() || status.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Self::new(status, failure.error, "PAYMENT_FAILED".to_string())
            }
        }
    }
}
