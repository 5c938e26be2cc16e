use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Embedding, completion or vector index call failed
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// The model answered with no usable text
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RagResult<T> = Result<T, RagError>;

impl From<qdrant_client::QdrantError> for RagError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        RagError::RemoteService(format!("qdrant: {err}"))
    }
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RagError::RemoteService(format!("request timed out: {err}"))
        } else {
            RagError::RemoteService(err.to_string())
        }
    }
}

impl From<core_config::ConfigError> for RagError {
    fn from(err: core_config::ConfigError) -> Self {
        RagError::Config(err.to_string())
    }
}

/// Remote and internal details are logged by [`AppError`], never returned.
impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Validation(msg) => AppError::BadRequest(msg),
            RagError::RemoteService(msg) => AppError::BadGateway(msg),
            RagError::Generation(msg) => AppError::BadGateway(format!("generation: {msg}")),
            RagError::Config(msg) => AppError::ServiceUnavailable(msg),
            RagError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for RagError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
