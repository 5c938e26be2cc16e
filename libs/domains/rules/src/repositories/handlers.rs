use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{CurrentUser, ErrorResponse, UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use super::entity;
use super::models::{ConnectRepository, Repository, RepositoryProvider};
use super::service::RepositoryService;
use super::store::RepositoryStore;
use crate::error::RuleResult;
use crate::generator::{GenerateRules, GeneratedRule, GenerationSource, RuleGenerator};
use crate::repository::RuleRepository;

/// OpenAPI documentation for the Repositories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_repositories,
        connect_repository,
        get_repository,
        disconnect_repository,
        generate_rules
    ),
    components(schemas(
        Repository,
        RepositoryProvider,
        ConnectRepository,
        GenerateRules,
        GeneratedRule,
        GenerationSource,
        ErrorResponse
    )),
    tags((name = entity::Model::TAG, description = "Connected source repositories"))
)]
pub struct ApiDoc;

pub struct RepositoriesState<R: RuleRepository, S: RepositoryStore> {
    pub service: RepositoryService<S>,
    pub generator: RuleGenerator<R, S>,
}

type SharedState<R, S> = State<Arc<RepositoriesState<R, S>>>;

pub fn router<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    service: RepositoryService<S>,
    generator: RuleGenerator<R, S>,
) -> Router {
    Router::new()
        .route("/", get(list_repositories::<R, S>).post(connect_repository::<R, S>))
        .route(
            "/{id}",
            get(get_repository::<R, S>).delete(disconnect_repository::<R, S>),
        )
        .route("/{id}/generate", post(generate_rules::<R, S>))
        .with_state(Arc::new(RepositoriesState { service, generator }))
}

/// List the caller's connected repositories
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Connected repositories", body = Vec<Repository>),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
async fn list_repositories<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    State(state): SharedState<R, S>,
    CurrentUser(user_id): CurrentUser,
) -> RuleResult<Json<Vec<Repository>>> {
    Ok(Json(state.service.list(user_id).await?))
}

/// Connect a repository
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    request_body = ConnectRepository,
    responses(
        (status = 201, description = "Repository connected", body = Repository),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Already connected", body = ErrorResponse)
    )
)]
async fn connect_repository<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    State(state): SharedState<R, S>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(input): ValidatedJson<ConnectRepository>,
) -> RuleResult<impl IntoResponse> {
    let repository = state.service.connect(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(repository)))
}

/// Get a connected repository
#[utoipa::path(
    get,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Repository ID")),
    responses(
        (status = 200, description = "Repository found", body = Repository),
        (status = 404, description = "Repository not found", body = ErrorResponse)
    )
)]
async fn get_repository<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    State(state): SharedState<R, S>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> RuleResult<Json<Repository>> {
    Ok(Json(state.service.get(id, user_id).await?))
}

/// Disconnect a repository; its rules are kept
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Repository ID")),
    responses(
        (status = 204, description = "Repository disconnected"),
        (status = 404, description = "Repository not found", body = ErrorResponse)
    )
)]
async fn disconnect_repository<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    State(state): SharedState<R, S>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> RuleResult<StatusCode> {
    state.service.disconnect(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate a rule for the repository, falling back to a template when RAG fails
#[utoipa::path(
    post,
    path = "/{id}/generate",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Repository ID")),
    request_body = GenerateRules,
    responses(
        (status = 201, description = "Rule generated and stored", body = GeneratedRule),
        (status = 404, description = "Repository not found", body = ErrorResponse)
    )
)]
async fn generate_rules<R: RuleRepository + 'static, S: RepositoryStore + 'static>(
    State(state): SharedState<R, S>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<GenerateRules>,
) -> RuleResult<impl IntoResponse> {
    let generated = state.generator.generate(user_id, id, input).await?;
    Ok((StatusCode::CREATED, Json(generated)))
}
