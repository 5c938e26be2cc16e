//! JSON extractor that runs `validator` rules before the handler sees the body.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserialize and validate a JSON body.
///
/// Rejections render through [`AppError`]: malformed JSON keeps axum's
/// status and message, failed validation becomes 400 with per-field details.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateRule {
///     #[validate(length(min = 1, max = 200))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateRule>) -> String {
///     payload.name
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
