//! End-to-end tests of the `/mcp` endpoint over in-memory stores.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_helpers::USER_ID_HEADER;
use domain_mcp::tokens::{CreateToken, InMemoryTokenStore, TokenService};
use domain_mcp::{McpServer, rule_tools};
use domain_rules::{CreateRule, InMemoryRuleRepository, Rule, RuleService};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct Harness {
    app: Router,
    rules: RuleService<InMemoryRuleRepository>,
    tokens: TokenService<InMemoryTokenStore>,
}

fn harness() -> Harness {
    let rules = RuleService::new(InMemoryRuleRepository::new());
    let tokens = TokenService::new(InMemoryTokenStore::new());
    let app = domain_mcp::router(
        McpServer::new(rule_tools(rules.clone())),
        Some(Arc::new(tokens.clone())),
    );
    Harness { app, rules, tokens }
}

fn rpc(user: Option<Uuid>, body: Value) -> Request<Body> {
    let mut builder = Request::post("/mcp").header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn seed_rules(rules: &RuleService<InMemoryRuleRepository>, owner: Uuid, n: usize) -> Vec<Rule> {
    let builder = TestDataBuilder::new(7);
    let mut created = Vec::new();
    for i in 0..n {
        created.push(
            rules
                .create(
                    owner,
                    CreateRule {
                        name: builder.name("rule", &i.to_string()),
                        content: builder.text(80),
                        repository_id: None,
                        active: true,
                    },
                )
                .await
                .unwrap(),
        );
    }
    created
}

fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_list_rules_returns_all_records_newest_first() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_list_rules").user_id();
    let created = seed_rules(&h.rules, owner, 3).await;
    seed_rules(&h.rules, Uuid::now_v7(), 2).await;

    let (status, body) = send_json(
        &h.app,
        rpc(
            Some(owner),
            json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "list_rules", "arguments": {}},
                "id": 1
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["content"][0]["type"], "text");

    let listed: Vec<Rule> = serde_json::from_value(tool_payload(&body)).unwrap();
    let expected: Vec<Rule> = created.into_iter().rev().collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn test_unknown_method_is_404_with_echoed_id() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_unknown_method").user_id();

    let (status, body) = send_json(
        &h.app,
        rpc(Some(owner), json!({"jsonrpc": "2.0", "method": "foo/bar", "id": "req-42"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["id"], "req-42");
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_missing_credentials_is_401() {
    let h = harness();

    let (status, body) = send_json(
        &h.app,
        rpc(None, json!({"jsonrpc": "2.0", "method": "tools/list", "id": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], -32001);
    assert_eq!(body["id"], 5);
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_bearer").user_id();
    seed_rules(&h.rules, owner, 2).await;
    let created = h
        .tokens
        .create(owner, CreateToken { name: "editor".into() })
        .await
        .unwrap();

    let request = Request::post("/mcp")
        .header(header::AUTHORIZATION, format!("Bearer {}", created.secret))
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "list_rules"},
                "id": 2
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = send_json(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(tool_payload(&body).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_revoked_token_is_401() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_revoked").user_id();
    let created = h
        .tokens
        .create(owner, CreateToken { name: "old".into() })
        .await
        .unwrap();
    h.tokens.revoke(created.token.id, owner).await.unwrap();

    let request = Request::post("/mcp")
        .header(header::AUTHORIZATION, format!("Bearer {}", created.secret))
        .body(Body::from(json!({"jsonrpc": "2.0", "method": "ping", "id": 1}).to_string()))
        .unwrap();
    let (status, body) = send_json(&h.app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], -32001);
}

#[tokio::test]
async fn test_notification_gets_empty_200() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_notification").user_id();

    let (status, bytes) = send(
        &h.app,
        rpc(Some(owner), json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_parse_error").user_id();

    let request = Request::post("/mcp")
        .header(USER_ID_HEADER, owner.to_string())
        .body(Body::from("{\"jsonrpc\": "))
        .unwrap();
    let (status, body) = send_json(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_get_rule_of_other_user_is_invalid_params() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_get_rule").user_id();
    let rule = seed_rules(&h.rules, owner, 1).await.remove(0);

    let (status, body) = send_json(
        &h.app,
        rpc(
            Some(Uuid::now_v7()),
            json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "get_rule", "arguments": {"rule_id": rule.id}},
                "id": 8
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_event_stream_opens() {
    let h = harness();
    let owner = TestDataBuilder::from_test_name("mcp_sse").user_id();

    let response = h
        .app
        .clone()
        .oneshot(
            Request::get("/mcp")
                .header(USER_ID_HEADER, owner.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: ready"));
}

#[tokio::test]
async fn test_event_stream_requires_credentials() {
    let h = harness();

    let (status, _) = send(&h.app, Request::get("/mcp").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
