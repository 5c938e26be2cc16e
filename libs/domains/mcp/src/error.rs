use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_rules::RuleError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::jsonrpc::ErrorCode;

/// Failures surfaced to protocol clients as JSON-RPC errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::MethodNotFound(_) => ErrorCode::MethodNotFound,
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message sent to the client; internal details stay in the logs
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "MCP request failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<RuleError> for McpError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NotFound(id) => Self::InvalidParams(format!("Rule {id} not found")),
            RuleError::RepositoryNotFound(id) => {
                Self::InvalidParams(format!("Repository {id} not found"))
            }
            RuleError::Validation(msg) => Self::InvalidParams(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for McpError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => Self::Unauthorized("Invalid API token".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Failures of API token management and bearer authentication
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("API token not found: {0}")]
    NotFound(Uuid),

    /// Malformed, unknown, revoked or not matching; callers never learn which
    #[error("Invalid API token")]
    InvalidToken,

    #[error("Failed to hash token: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type TokenResult<T> = Result<T, TokenError>;

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotFound(id) => AppError::NotFound(format!("API token {id} not found")),
            TokenError::InvalidToken => AppError::Unauthorized("Invalid API token".to_string()),
            TokenError::Hash(msg) => AppError::InternalServerError(msg),
            TokenError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
