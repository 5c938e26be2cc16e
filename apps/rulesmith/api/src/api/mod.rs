use std::sync::Arc;

use axum::Router;
use domain_mcp::tokens::{PgTokenStore, TokenService};
use domain_mcp::{BearerAuthenticator, McpServer, rule_tools};
use domain_rules::repositories::{PgRepositoryStore, RepositoryService};
use domain_rules::{PgRuleRepository, RuleGenerator, RuleService, VectorRuleIndexer};

use crate::state::AppState;

pub mod health;

/// Every route of the service: the dashboard API under `/api` and the
/// protocol endpoint at `/mcp`.
///
/// Services are built once here and shared by the routers that need them.
pub fn routes(state: &AppState) -> Router {
    let mut rules = RuleService::new(PgRuleRepository::new(state.db.clone()));
    if let Some(embedder) = &state.embedder {
        rules = rules.with_indexer(Arc::new(VectorRuleIndexer::new(
            embedder.clone(),
            state.vector_index.clone(),
        )));
    }

    let repositories = RepositoryService::new(PgRepositoryStore::new(state.db.clone()));
    let generator = RuleGenerator::new(
        rules.clone(),
        repositories.clone(),
        state.rag.as_ref().map(|rag| rag.orchestrator()),
    );
    let tokens = TokenService::new(PgTokenStore::new(state.db.clone()));
    let authenticator: Arc<dyn BearerAuthenticator> = Arc::new(tokens.clone());

    let api = Router::new()
        .nest("/rules", domain_rules::handlers::router(rules.clone()))
        .nest(
            "/repositories",
            domain_rules::repositories::handlers::router(repositories, generator),
        )
        .nest("/tokens", domain_mcp::tokens::handlers::router(tokens))
        .merge(domain_rag::handlers::router(state.rag.clone()));

    Router::new()
        .nest("/api", api)
        .merge(domain_mcp::router(
            McpServer::new(rule_tools(rules)),
            Some(authenticator),
        ))
}

/// `/ready` with real dependency checks; merged next to the stateless app router
pub fn ready_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::USER_ID_HEADER;
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use domain_rag::{InMemoryVectorIndex, RagConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn state() -> AppState {
        let config = Config {
            app: app_info!(),
            database: PostgresConfig::new("postgresql://localhost/rulesmith"),
            server: ServerConfig::default(),
            environment: Environment::Development,
            rag: RagConfig::default(),
            openai: None,
            qdrant: None,
            run_migrations: false,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        AppState::with_vector_index(config, db, Arc::new(InMemoryVectorIndex::new())).unwrap()
    }

    async fn status(request: Request<Body>) -> StatusCode {
        routes(&state()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_dashboard_routes_require_identity() {
        for uri in ["/api/rules", "/api/repositories", "/api/tokens"] {
            let code = status(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(code, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_search_without_openai_is_unavailable() {
        let request = Request::post("/api/search")
            .header(USER_ID_HEADER, uuid::Uuid::now_v7().to_string())
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query":"error handling"}"#))
            .unwrap();

        assert_eq!(status(request).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_mcp_is_mounted_at_root() {
        let request = Request::post("/mcp")
            .body(Body::from(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#))
            .unwrap();

        assert_eq!(status(request).await, StatusCode::UNAUTHORIZED);
    }
}
