use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{McpError, McpResult};
use crate::jsonrpc::{ErrorCode, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse};
use crate::tools::Tool;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Serialize)]
struct ServerInfo {
    name: String,
    version: String,
}

/// Dispatches JSON-RPC requests to the tool catalog
pub struct McpServer {
    tools: Vec<Box<dyn Tool>>,
    server_info: ServerInfo,
}

impl McpServer {
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self {
            tools,
            server_info: ServerInfo {
                name: "rulesmith".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Handle a request for an authenticated caller. Notifications yield `None`.
    pub async fn handle(&self, caller: Uuid, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Acknowledged notification");
            return None;
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(caller, request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                tracing::info!(method = %request.method, code = e.code().code(), "JSON-RPC error");
                error_response(request.id, &e)
            }
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": self.server_info,
            "capabilities": {
                "tools": {}
            }
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema()
                })
            })
            .collect();

        json!({ "tools": tools })
    }

    async fn call_tool(&self, caller: Uuid, params: Value) -> McpResult<Value> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::InvalidParams("Missing tool name".to_string()))?;

        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {name}")))?;

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let output = tool.call(caller, arguments).await?;
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| McpError::Internal(e.to_string()))?;

        tracing::debug!(tool = name, %caller, "Tool call succeeded");
        Ok(json!({
            "content": [{
                "type": "text",
                "text": text
            }]
        }))
    }
}

pub fn error_response(id: Option<Value>, error: &McpError) -> JsonRpcResponse {
    JsonRpcResponse::error(id, error.code(), error.client_message())
}

/// Parse a raw request body. On failure the error response to send is returned.
pub fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| JsonRpcResponse::error(None, ErrorCode::ParseError, format!("Parse error: {e}")))?;

    let id = value.get("id").cloned();
    if !value.is_object() {
        return Err(error_response(
            id,
            &McpError::InvalidRequest("expected a single request object".to_string()),
        ));
    }

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| error_response(id.clone(), &McpError::InvalidRequest(e.to_string())))?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(error_response(
            id,
            &McpError::InvalidRequest(format!("unsupported jsonrpc version {:?}", request.jsonrpc)),
        ));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::rule_tools;
    use domain_rules::{InMemoryRuleRepository, RuleService};

    fn server() -> McpServer {
        McpServer::new(rule_tools(RuleService::new(InMemoryRuleRepository::new())))
    }

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_reports_capabilities() {
        let response = server()
            .handle(
                Uuid::now_v7(),
                request(json!({"jsonrpc": "2.0", "method": "initialize", "id": 1})),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "rulesmith");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_includes_list_rules() {
        let response = server()
            .handle(
                Uuid::now_v7(),
                request(json!({"jsonrpc": "2.0", "method": "tools/list", "id": "a"})),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        let list_rules = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "list_rules")
            .unwrap();
        assert!(list_rules["inputSchema"]["properties"]["repository_id"].is_object());
        assert_eq!(response.id, json!("a"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let response = server()
            .handle(
                Uuid::now_v7(),
                request(json!({
                    "jsonrpc": "2.0",
                    "method": "tools/call",
                    "params": {"name": "drop_tables"},
                    "id": 3
                })),
            )
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_missing_tool_name_is_invalid_params() {
        let response = server()
            .handle(
                Uuid::now_v7(),
                request(json!({"jsonrpc": "2.0", "method": "tools/call", "params": {}, "id": 4})),
            )
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let response = server()
            .handle(
                Uuid::now_v7(),
                request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
            )
            .await;

        assert!(response.is_none());
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_request(b"{not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, -32700);
        assert_eq!(err.id, Value::Null);

        let err = parse_request(br#"[{"jsonrpc":"2.0","method":"ping","id":1}]"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, -32600);

        let err = parse_request(br#"{"jsonrpc":"1.0","method":"ping","id":9}"#).unwrap_err();
        assert_eq!(err.error.as_ref().unwrap().code, -32600);
        assert_eq!(err.id, json!(9));

        let err = parse_request(br#"{"jsonrpc":"2.0","id":10}"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, -32600);
        assert_eq!(err.id, json!(10));
    }
}
