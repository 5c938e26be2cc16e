//! Caller resolution for the protocol endpoint.
//!
//! A bearer API token wins when an `Authorization` header is present;
//! otherwise the gateway's identity header is trusted.

use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_helpers::CurrentUser;
use uuid::Uuid;

use crate::error::{McpError, McpResult, TokenResult};
use crate::tokens::{TokenService, TokenStore};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BearerAuthenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> TokenResult<Uuid>;
}

#[async_trait]
impl<S: TokenStore + 'static> BearerAuthenticator for TokenService<S> {
    async fn authenticate(&self, token: &str) -> TokenResult<Uuid> {
        TokenService::authenticate(self, token).await
    }
}

pub async fn resolve_caller(
    headers: &HeaderMap,
    tokens: Option<&dyn BearerAuthenticator>,
) -> McpResult<Uuid> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| McpError::Unauthorized("Expected a Bearer token".to_string()))?;
        let tokens = tokens
            .ok_or_else(|| McpError::Unauthorized("API tokens are not enabled".to_string()))?;

        return tokens.authenticate(token).await.map_err(McpError::from);
    }

    CurrentUser::from_headers(headers)
        .map(|CurrentUser(id)| id)
        .ok_or_else(|| McpError::Unauthorized("Missing credentials".to_string()))
}
