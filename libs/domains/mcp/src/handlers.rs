use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::post,
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

use crate::auth::{BearerAuthenticator, resolve_caller};
use crate::jsonrpc::JsonRpcResponse;
use crate::server::{McpServer, PROTOCOL_VERSION, error_response, parse_request};

#[derive(Clone)]
struct McpState {
    server: Arc<McpServer>,
    tokens: Option<Arc<dyn BearerAuthenticator>>,
}

/// `POST /mcp` for JSON-RPC, `GET /mcp` for the event stream
pub fn router(server: McpServer, tokens: Option<Arc<dyn BearerAuthenticator>>) -> Router {
    Router::new()
        .route("/mcp", post(handle_rpc).get(event_stream))
        .with_state(McpState {
            server: Arc::new(server),
            tokens,
        })
}

fn rpc_response(response: JsonRpcResponse) -> Response {
    (response.status(), Json(response)).into_response()
}

async fn handle_rpc(State(state): State<McpState>, headers: HeaderMap, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(response) => return rpc_response(response),
    };

    let caller = match resolve_caller(&headers, state.tokens.as_deref()).await {
        Ok(caller) => caller,
        Err(e) => return rpc_response(error_response(request.id, &e)),
    };

    match state.server.handle(caller, request).await {
        Some(response) => rpc_response(response),
        None => StatusCode::OK.into_response(),
    }
}

/// One `ready` event, then keep-alive comments until the client disconnects
async fn event_stream(
    State(state): State<McpState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Response> {
    let caller = resolve_caller(&headers, state.tokens.as_deref())
        .await
        .map_err(|e| rpc_response(error_response(None, &e)))?;

    tracing::debug!(%caller, "Opened MCP event stream");

    let ready = Event::default()
        .event("ready")
        .data(json!({ "protocolVersion": PROTOCOL_VERSION }).to_string());
    let events = stream::once(async move { Ok::<_, Infallible>(ready) }).chain(stream::pending());

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
