//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// Single UUID path segment; a malformed value is a 400 with `INVALID_UUID`.
///
/// ```ignore
/// async fn get_rule(UuidPath(id): UuidPath) -> String {
///     format!("rule {id}")
/// }
///
/// let app = Router::new().route("/rules/{id}", get(get_rule));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Ok(UuidPath(Uuid::parse_str(&raw)?))
    }
}
