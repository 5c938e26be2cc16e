use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{CurrentUser, ErrorResponse, UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::entity;
use crate::error::RuleResult;
use crate::models::{CreateRule, Rule, RuleFilter, UpdateRule};
use crate::repository::RuleRepository;
use crate::service::RuleService;

/// OpenAPI documentation for the Rules API
#[derive(OpenApi)]
#[openapi(
    paths(list_rules, create_rule, get_rule, update_rule, delete_rule, rule_history),
    components(schemas(Rule, CreateRule, UpdateRule, ErrorResponse)),
    tags((name = entity::Model::TAG, description = "Versioned coding rules"))
)]
pub struct ApiDoc;

pub fn router<R: RuleRepository + 'static>(service: RuleService<R>) -> Router {
    Router::new()
        .route("/", get(list_rules::<R>).post(create_rule::<R>))
        .route(
            "/{id}",
            get(get_rule::<R>).put(update_rule::<R>).delete(delete_rule::<R>),
        )
        .route("/{id}/history", get(rule_history::<R>))
        .with_state(Arc::new(service))
}

/// List the caller's rules, newest first
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    params(RuleFilter),
    responses(
        (status = 200, description = "Rules, newest first", body = Vec<Rule>),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
async fn list_rules<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<RuleFilter>,
) -> RuleResult<Json<Vec<Rule>>> {
    Ok(Json(service.list(user_id, filter).await?))
}

/// Create version 1 of a new rule
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    request_body = CreateRule,
    responses(
        (status = 201, description = "Rule created", body = Rule),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
async fn create_rule<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateRule>,
) -> RuleResult<impl IntoResponse> {
    let rule = service.create(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Get one rule version
#[utoipa::path(
    get,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Rule version ID")),
    responses(
        (status = 200, description = "Rule found", body = Rule),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    )
)]
async fn get_rule<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> RuleResult<Json<Rule>> {
    Ok(Json(service.get(id, user_id).await?))
}

/// Store a new version; omitted fields keep their previous values
#[utoipa::path(
    put,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Latest rule version ID")),
    request_body = UpdateRule,
    responses(
        (status = 200, description = "New version created", body = Rule),
        (status = 404, description = "Rule not found", body = ErrorResponse),
        (status = 409, description = "Version already superseded", body = ErrorResponse)
    )
)]
async fn update_rule<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateRule>,
) -> RuleResult<Json<Rule>> {
    Ok(Json(service.update(id, user_id, input).await?))
}

/// Delete every version of a rule
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Any version ID of the rule")),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    )
)]
async fn delete_rule<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> RuleResult<StatusCode> {
    service.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All versions of a rule, oldest first
#[utoipa::path(
    get,
    path = "/{id}/history",
    tag = entity::Model::TAG,
    params(("id" = Uuid, Path, description = "Any version ID of the rule")),
    responses(
        (status = 200, description = "Version history", body = Vec<Rule>),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    )
)]
async fn rule_history<R: RuleRepository + 'static>(
    State(service): State<Arc<RuleService<R>>>,
    CurrentUser(user_id): CurrentUser,
    UuidPath(id): UuidPath,
) -> RuleResult<Json<Vec<Rule>>> {
    Ok(Json(service.history(id, user_id).await?))
}
