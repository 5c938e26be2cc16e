use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use axum_helpers::{CurrentUser, ErrorResponse, UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use super::entity;
use super::models::{ApiToken, CreateToken, CreatedToken};
use super::service::TokenService;
use super::store::TokenStore;
use crate::error::TokenResult;

/// OpenAPI documentation for the API token endpoints
#[derive(OpenApi)]
#[openapi(
    paths(list_tokens, create_token, revoke_token),
    components(schemas(ApiToken, CreateToken, CreatedToken, ErrorResponse)),
    tags((name = entity::Model::TAG, description = "API tokens for editor integrations"))
)]
pub struct ApiDoc;

pub fn router<S: TokenStore + 'static>(service: TokenService<S>) -> Router {
    Router::new()
        .route("/", get(list_tokens::<S>).post(create_token::<S>))
        .route("/{id}", delete(revoke_token::<S>))
        .with_state(Arc::new(service))
}

/// List the caller's API tokens
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Tokens, newest first", body = Vec<ApiToken>),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
async fn list_tokens<S: TokenStore + 'static>(
    State(service): State<Arc<TokenService<S>>>,
    CurrentUser(user_id): CurrentUser,
) -> TokenResult<Json<Vec<ApiToken>>> {
    Ok(Json(service.list(user_id).await?))
}

/// Create a token; the secret is only returned in this response
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    request_body = CreateToken,
    responses(
        (status = 201, description = "Token created", body = CreatedToken),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
async fn create_token<S: TokenStore + 'static>(
    State(service): State<Arc<TokenService<S>>>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateToken>,
) -> TokenResult<impl IntoResponse> {
    let created = service.create(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Revoke a token
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Token ID")),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 404, description = "Token not found", body = ErrorResponse)
    )
)]
async fn revoke_token<S: TokenStore + 'static>(
    State(service): State<Arc<TokenService<S>>>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> TokenResult<StatusCode> {
    service.revoke(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
