use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Rulesmith API",
        version = "0.1.0",
        description = "Versioned coding rules, connected repositories, documentation retrieval and API tokens"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/rules", api = domain_rules::ApiDoc),
        (path = "/repositories", api = domain_rules::repositories::handlers::ApiDoc),
        (path = "/tokens", api = domain_mcp::tokens::handlers::ApiDoc)
    )
)]
struct RoutedApiDoc;

/// The service's OpenAPI document. Documentation routes sit at the API root,
/// so their document is merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = RoutedApiDoc::openapi();
        doc.merge(domain_rag::ApiDoc::openapi());
        doc
    }
}
