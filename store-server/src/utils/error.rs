//! Unified error handling
//!
//! Application-level error type and response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! Error codes come from [`shared::error::ApiErrorCode`]; clients switch on
//! the code string, messages are for humans.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiErrorCode;
use tracing::error;

/// Unified API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 = success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Identity errors (4xx) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Wrong state or expired window for a transition
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    // ========== System errors (5xx) ==========
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl AppError {
    fn code(&self) -> ApiErrorCode {
        match self {
            Self::Unauthorized => ApiErrorCode::Unauthorized,
            Self::Forbidden(_) => ApiErrorCode::Forbidden,
            Self::NotFound(_) => ApiErrorCode::NotFound,
            Self::Conflict(_) => ApiErrorCode::Conflict,
            Self::Validation(_) => ApiErrorCode::Validation,
            Self::BusinessRule(_) => ApiErrorCode::BusinessRule,
            Self::PreconditionFailed(_) => ApiErrorCode::PreconditionFailed,
            Self::Storage(_) => ApiErrorCode::Storage,
            Self::Internal(_) => ApiErrorCode::Internal,
            Self::Invalid(_) => ApiErrorCode::Invalid,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::BusinessRule(_) | Self::PreconditionFailed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // 5xx details go to the log, not the client
        let message = match &self {
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                code.default_message().to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                code.default_message().to_string()
            }
            other => other.to_string(),
        };

        let body = Json(AppResponse::<()> {
            code: code.code().to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

/// `AppResult<T>` - handler result type
pub type AppResult<T> = Result<T, AppError>;

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: ApiErrorCode::Success.code().to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: ApiErrorCode::Success.code().to_string(),
        message: message.into(),
        data: Some(data),
    })
}
