use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{CurrentUser, ErrorResponse, ValidatedJson};
use utoipa::OpenApi;

use crate::error::{RagError, RagResult};
use crate::models::{
    IndexDocumentsRequest, IndexReport, RetrievedChunk, SearchRequest, SearchResponse,
    SourceDocument,
};
use crate::service::RagService;

pub const TAG: &str = "documents";

/// OpenAPI documentation for the documentation/RAG API
#[derive(OpenApi)]
#[openapi(
    paths(index_documents, search),
    components(schemas(
        IndexDocumentsRequest,
        SourceDocument,
        IndexReport,
        SearchRequest,
        SearchResponse,
        RetrievedChunk,
        ErrorResponse
    )),
    tags((name = TAG, description = "Documentation indexing and retrieval"))
)]
pub struct ApiDoc;

type SharedService = Option<Arc<RagService>>;

/// Documentation routes. Without a configured pipeline every route answers 503.
pub fn router(service: Option<Arc<RagService>>) -> Router {
    Router::new()
        .route("/documents", post(index_documents))
        .route("/search", post(search))
        .with_state(service)
}

fn configured(service: &SharedService) -> RagResult<&RagService> {
    service.as_deref().ok_or_else(|| {
        RagError::Config("documentation retrieval is not configured".to_string())
    })
}

/// Chunk, embed and store documentation for the caller
#[utoipa::path(
    post,
    path = "/documents",
    tag = TAG,
    request_body = IndexDocumentsRequest,
    params(("x-user-id" = Uuid, Header, description = "Caller id forwarded by the gateway")),
    responses(
        (status = 200, description = "Indexing finished", body = IndexReport),
        (status = 400, description = "Invalid documents", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 503, description = "Retrieval not configured", body = ErrorResponse)
    )
)]
async fn index_documents(
    State(service): State<SharedService>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(input): ValidatedJson<IndexDocumentsRequest>,
) -> RagResult<Json<IndexReport>> {
    let report = configured(&service)?.index_documents(user_id, input).await?;
    Ok(Json(report))
}

/// Retrieve the caller's most relevant documentation chunks
#[utoipa::path(
    post,
    path = "/search",
    tag = TAG,
    request_body = SearchRequest,
    params(("x-user-id" = Uuid, Header, description = "Caller id forwarded by the gateway")),
    responses(
        (status = 200, description = "Matching chunks", body = SearchResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 502, description = "Embedding or index call failed", body = ErrorResponse)
    )
)]
async fn search(
    State(service): State<SharedService>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(input): ValidatedJson<SearchRequest>,
) -> RagResult<Json<SearchResponse>> {
    let response = configured(&service)?.search(user_id, input).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletionProvider;
    use crate::config::RagConfig;
    use crate::embedding::MockEmbeddingProvider;
    use crate::index::InMemoryVectorIndex;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::USER_ID_HEADER;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use test_utils::TestDataBuilder;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.5]));

        let service = RagService::new(
            &RagConfig::default(),
            Arc::new(embedder),
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(MockCompletionProvider::new()),
        )
        .unwrap();

        router(Some(Arc::new(service)))
    }

    fn post_json(uri: &str, user: Option<uuid::Uuid>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_then_search() {
        let builder = TestDataBuilder::from_test_name("handlers_index_search");
        let user = builder.user_id();
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/documents",
                Some(user),
                json!({ "documents": [{ "source": "guide.md", "text": "Use snake_case." }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "succeeded": 1, "failed": 0, "skipped": 0 })
        );

        let response = app
            .oneshot(post_json("/search", Some(user), json!({ "query": "naming" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["chunks"][0]["preview"], "Use snake_case.");
        assert_eq!(body["chunks"][0]["source"], "guide.md");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let response = app()
            .oneshot(post_json("/search", None, json!({ "query": "naming" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let response = app()
            .oneshot(post_json("/search", Some(uuid::Uuid::new_v4()), json!({ "query": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unconfigured_pipeline_is_unavailable() {
        let response = router(None)
            .oneshot(post_json("/search", Some(uuid::Uuid::new_v4()), json!({ "query": "naming" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
