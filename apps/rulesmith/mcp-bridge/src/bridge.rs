use axum_helpers::USER_ID_HEADER;
use domain_mcp::jsonrpc::NOTIFICATION_PREFIX;
use domain_mcp::{ErrorCode, JsonRpcResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use uuid::Uuid;

/// How the bridge identifies itself to the server
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub user_id: Option<Uuid>,
}

pub struct Bridge {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
}

impl Bridge {
    pub fn new(url: String, credentials: Credentials, timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward one line. Returns the line to print, if any.
    pub async fn forward(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable input line");
                return Some(render(JsonRpcResponse::error(
                    None,
                    ErrorCode::ParseError,
                    format!("Parse error: {e}"),
                )));
            }
        };

        let id = message.get("id").cloned();
        let notification = is_notification(&message);

        match self.post(line).await {
            Ok(body) if notification => {
                tracing::debug!(bytes = body.len(), "Notification acknowledged");
                None
            }
            Ok(body) => Some(match serde_json::from_str::<Value>(&body) {
                Ok(reply) => reply.to_string(),
                Err(_) => {
                    tracing::warn!(body = %truncate(&body, 200), "Server replied with non-JSON body");
                    internal_error(id, "Invalid response from server")
                }
            }),
            Err(e) if notification => {
                tracing::warn!(error = %e, "Failed to forward notification");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reach server");
                Some(internal_error(id, &format!("Transport error: {e}")))
            }
        }
    }

    /// Sends the message verbatim; any HTTP status is fine, JSON-RPC errors ride in the body
    async fn post(&self, body: &str) -> reqwest::Result<String> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned());
        if let Some(token) = &self.credentials.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(user_id) = self.credentials.user_id {
            request = request.header(USER_ID_HEADER, user_id.to_string());
        }

        request.send().await?.text().await
    }
}

/// Only objects can be notifications; batches and scalars always get a reply
fn is_notification(message: &Value) -> bool {
    let Some(object) = message.as_object() else {
        return false;
    };
    let method_is_notification = object
        .get("method")
        .and_then(Value::as_str)
        .is_some_and(|m| m.starts_with(NOTIFICATION_PREFIX));
    method_is_notification || !object.contains_key("id")
}

fn internal_error(id: Option<Value>, message: &str) -> String {
    render(JsonRpcResponse::error(id, ErrorCode::InternalError, message))
}

fn render(response: JsonRpcResponse) -> String {
    serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#
            .to_string()
    })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Pump lines from `input` through the bridge until EOF, one request at a time
pub async fn run<R, W>(bridge: &Bridge, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();

    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = bridge.forward(&line).await {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::routing::post;
    use domain_mcp::{McpServer, rule_tools};
    use domain_rules::{CreateRule, InMemoryRuleRepository, RuleService};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn rulesmith(owner: Uuid) -> String {
        let rules = RuleService::new(InMemoryRuleRepository::new());
        rules
            .create(
                owner,
                CreateRule {
                    name: "naming".into(),
                    content: "snake_case".into(),
                    repository_id: None,
                    active: true,
                },
            )
            .await
            .unwrap();
        let base = serve(domain_mcp::router(McpServer::new(rule_tools(rules)), None)).await;
        format!("{base}/mcp")
    }

    fn bridge(url: String, user_id: Option<Uuid>) -> Bridge {
        Bridge::new(
            url,
            Credentials {
                token: None,
                user_id,
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    async fn pump(bridge: &Bridge, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        run(bridge, input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_requests_are_forwarded_in_order() {
        let owner = Uuid::now_v7();
        let bridge = bridge(rulesmith(owner).await, Some(owner));

        let input = [
            json!({"jsonrpc": "2.0", "method": "initialize", "id": 1}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "method": "tools/list", "id": 2}),
            json!({"jsonrpc": "2.0", "method": "tools/call", "params": {"name": "list_rules"}, "id": 3}),
        ]
        .map(|m| m.to_string())
        .join("\n");

        let replies = pump(&bridge, &input).await;

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["id"], 2);
        assert!(replies[1]["result"]["tools"].is_array());
        assert_eq!(replies[2]["id"], 3);
        let text = replies[2]["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("snake_case"));
    }

    #[tokio::test]
    async fn test_server_errors_pass_through() {
        let owner = Uuid::now_v7();
        let bridge = bridge(rulesmith(owner).await, None);

        let replies = pump(&bridge, r#"{"jsonrpc":"2.0","method":"tools/list","id":"x"}"#).await;

        assert_eq!(replies[0]["error"]["code"], -32001);
        assert_eq!(replies[0]["id"], "x");
    }

    #[tokio::test]
    async fn test_unparsable_line_is_parse_error() {
        let bridge = bridge("http://127.0.0.1:9/mcp".into(), None);

        let replies = pump(&bridge, "{\"jsonrpc\": \n\n").await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[0]["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal_error() {
        // Nothing listens on the discard port
        let bridge = bridge("http://127.0.0.1:9/mcp".into(), Some(Uuid::now_v7()));

        let replies = pump(&bridge, r#"{"jsonrpc":"2.0","method":"ping","id":7}"#).await;

        assert_eq!(replies[0]["error"]["code"], -32603);
        assert_eq!(replies[0]["id"], 7);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_internal_error() {
        let app = Router::new().route("/mcp", post(|| async { "<html>gateway timeout</html>" }));
        let url = format!("{}/mcp", serve(app).await);
        let bridge = bridge(url, Some(Uuid::now_v7()));

        let replies = pump(&bridge, r#"{"jsonrpc":"2.0","method":"ping","id":"p"}"#).await;

        assert_eq!(replies[0]["error"]["code"], -32603);
        assert_eq!(replies[0]["id"], "p");
    }

    #[tokio::test]
    async fn test_failed_notification_prints_nothing() {
        let bridge = bridge("http://127.0.0.1:9/mcp".into(), None);

        let replies = pump(&bridge, r#"{"jsonrpc":"2.0","method":"notifications/cancelled"}"#).await;

        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_batches_and_scalars_get_invalid_request_replies() {
        let owner = Uuid::now_v7();
        let bridge = bridge(rulesmith(owner).await, Some(owner));

        let batch = pump(&bridge, r#"[{"jsonrpc":"2.0","method":"tools/list","id":1}]"#).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0]["error"]["code"], -32600);

        let scalar = pump(&bridge, "42").await;
        assert_eq!(scalar.len(), 1);
        assert_eq!(scalar[0]["error"]["code"], -32600);
    }

    #[test]
    fn test_only_objects_are_notifications() {
        assert!(is_notification(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"})));
        assert!(is_notification(&json!({"jsonrpc": "2.0", "method": "ping"})));
        assert!(!is_notification(&json!({"jsonrpc": "2.0", "method": "ping", "id": 1})));
        assert!(!is_notification(&json!([{"jsonrpc": "2.0", "method": "ping"}])));
        assert!(!is_notification(&json!(42)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
