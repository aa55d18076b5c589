//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use hotel_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Offending input field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An `AppError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    /// The domain error.
    pub error: AppError,
    /// Response status.
    pub status: StatusCode,
}

impl ApiError {
    /// Missing or invalid credentials, answered with 401.
    pub fn unauthenticated(error: AppError) -> Self {
        Self {
            error,
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let status = status_for(error.kind);
        Self { error, status }
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Persistence => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "VALIDATION_ERROR",
        ErrorKind::Conflict => "CONFLICT",
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::Authorization => "AUTHORIZATION_ERROR",
        ErrorKind::Persistence => "PERSISTENCE_ERROR",
        ErrorKind::Configuration | ErrorKind::Internal => "INTERNAL_ERROR",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.error;
        match error.kind {
            ErrorKind::Persistence => {
                tracing::warn!(error = %error.message, source = ?error.source, "Storage unavailable");
            }
            ErrorKind::Configuration | ErrorKind::Internal => {
                tracing::error!(error = %error.message, source = ?error.source, "Internal server error");
            }
            _ => {}
        }

        // Internal failures do not leak their message.
        let message = match error.kind {
            ErrorKind::Configuration | ErrorKind::Internal => "Internal server error".to_string(),
            _ => error.message,
        };
        let body = ApiErrorResponse {
            error: error_code(error.kind).to_string(),
            message,
            field: error.field,
            details: error.details,
        };

        (self.status, Json(body)).into_response()
    }
}
