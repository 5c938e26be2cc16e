use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_rag::RagError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule not found: {0}")]
    NotFound(Uuid),

    /// Updating anything but the newest version would fork the history
    #[error("Rule {0} already has a newer version")]
    AlreadySuperseded(Uuid),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(Uuid),

    #[error("Repository '{0}' is already connected")]
    DuplicateRepository(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RuleResult<T> = Result<T, RuleError>;

impl From<RuleError> for AppError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NotFound(id) => AppError::NotFound(format!("Rule {id} not found")),
            RuleError::AlreadySuperseded(id) => AppError::Conflict(format!(
                "Rule {id} has already been superseded; update the latest version"
            )),
            RuleError::RepositoryNotFound(id) => {
                AppError::NotFound(format!("Repository {id} not found"))
            }
            RuleError::DuplicateRepository(name) => {
                AppError::Conflict(format!("Repository '{name}' is already connected"))
            }
            RuleError::Validation(msg) => AppError::BadRequest(msg),
            RuleError::Rag(e) => e.into(),
            RuleError::Database(e) => AppError::Database(e),
            RuleError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for RuleError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
