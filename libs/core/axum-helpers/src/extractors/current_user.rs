//! Caller identity forwarded by the identity-provider gateway.

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, read from [`USER_ID_HEADER`].
///
/// Authentication itself happens upstream; this service trusts the header.
/// A missing or malformed value is rejected with 401.
///
/// ```ignore
/// async fn list_rules(CurrentUser(user_id): CurrentUser) -> String {
///     format!("rules for {user_id}")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl CurrentUser {
    /// Parse the identity header from a header map, if present and well formed
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Option<Self> {
        headers
            .get(USER_ID_HEADER)?
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(CurrentUser)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized(format!("missing or invalid {USER_ID_HEADER} header"))
        })
    }
}
