pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1008,
///   "error": "CONFLICT",
///   "message": "rule 5c1e... has already been superseded"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable identifier
    pub error: String,
    pub message: String,
    /// Structured details, e.g. per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type that renders as an [`ErrorResponse`].
///
/// Domain crates convert their own errors into this at the HTTP boundary.
/// Internal details (SQL errors, upstream payloads) are logged, never returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
        match self {
            AppError::SerdeJson(e) => {
                tracing::error!(error_code = ErrorCode::SerdeJsonError.code(), error = %e, "JSON error");
                internal(ErrorCode::SerdeJsonError)
            }
            AppError::Database(e) => map_db_error(e),
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::JsonExtraction.code(), error = %e, "JSON extraction failed");
                (e.status(), ErrorCode::JsonExtraction, e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = ErrorCode::ValidationError.code(), "Validation failed: {e}");
                let details = serde_json::to_value(&e).ok();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    details,
                )
            }
            AppError::UuidError(e) => {
                tracing::info!(error_code = ErrorCode::InvalidUuid.code(), error = %e, "Invalid UUID");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidUuid,
                    ErrorCode::InvalidUuid.default_message().to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {msg}");
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {msg}");
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg, None)
            }
            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden: {msg}");
                (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {msg}");
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::Conflict(msg) => {
                tracing::info!(error_code = ErrorCode::Conflict.code(), "Conflict: {msg}");
                (StatusCode::CONFLICT, ErrorCode::Conflict, msg, None)
            }
            AppError::BadGateway(msg) => {
                tracing::error!(error_code = ErrorCode::UpstreamError.code(), "Upstream failure: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorCode::UpstreamError,
                    ErrorCode::UpstreamError.default_message().to_string(),
                    None,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = ErrorCode::InternalError.code(), "Internal error: {msg}");
                internal(ErrorCode::InternalError)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable, msg, None)
            }
        }
    }
}

fn internal(code: ErrorCode) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        code,
        code.default_message().to_string(),
        None,
    )
}

fn map_db_error(error: DbErr) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = error.sql_err() {
        tracing::info!(error_code = ErrorCode::Conflict.code(), "Unique constraint violated: {detail}");
        return (
            StatusCode::CONFLICT,
            ErrorCode::Conflict,
            ErrorCode::Conflict.default_message().to_string(),
            None,
        );
    }

    match error {
        DbErr::RecordNotFound(msg) => {
            tracing::info!(error_code = ErrorCode::NotFound.code(), "Record not found: {msg}");
            (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                ErrorCode::NotFound.default_message().to_string(),
                None,
            )
        }
        DbErr::ConnectionAcquire(e) => {
            tracing::warn!(error_code = ErrorCode::DatabaseError.code(), error = %e, "Database pool exhausted");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                ErrorCode::ServiceUnavailable.default_message().to_string(),
                None,
            )
        }
        other => {
            tracing::error!(error_code = ErrorCode::DatabaseError.code(), error = %other, "Database error");
            internal(ErrorCode::DatabaseError)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        let body = ErrorResponse {
            details,
            ..ErrorResponse::new(code, message)
        };
        (status, Json(body)).into_response()
    }
}

/// Build an error response without going through [`AppError`]
pub fn error_response(status: StatusCode, message: impl Into<String>, code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let (status, body) = render(AppError::NotFound("rule not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["code"], 1004);
        assert_eq!(body["message"], "rule not found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = render(AppError::InternalServerError("pool poisoned at 0x1".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_bad_gateway_hides_upstream_payload() {
        let (status, body) = render(AppError::BadGateway("openai returned 500: {...}".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "UPSTREAM_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("openai"));
    }

    #[tokio::test]
    async fn test_db_record_not_found_maps_to_404() {
        let (status, _) = render(AppError::Database(DbErr::RecordNotFound("rules".into()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_db_custom_error_maps_to_500() {
        let (status, body) = render(AppError::Database(DbErr::Custom("boom".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
    }
}
