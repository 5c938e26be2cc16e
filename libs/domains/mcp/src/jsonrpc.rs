//! JSON-RPC 2.0 envelope types.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Methods with this prefix are fire-and-forget and get an empty acknowledgement
pub const NOTIFICATION_PREFIX: &str = "notifications/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.method.starts_with(NOTIFICATION_PREFIX)
    }
}

/// Standard and application error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    Unauthorized,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Unauthorized => -32001,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            -32001 => Some(Self::Unauthorized),
            _ => None,
        }
    }

    /// HTTP status the endpoint answers with when this error is returned
    pub fn status(self) -> StatusCode {
        match self {
            Self::ParseError | Self::InvalidRequest | Self::InvalidParams => {
                StatusCode::BAD_REQUEST
            }
            Self::MethodNotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Echoed from the request; `null` when it could not be read
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id: id.unwrap_or(Value::Null),
        }
    }

    pub fn error(id: Option<Value>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: code.code(),
                message: message.into(),
                data: None,
            }),
            id: id.unwrap_or(Value::Null),
        }
    }

    /// HTTP status for this response: 200 on success, otherwise per error code
    pub fn status(&self) -> StatusCode {
        let Some(error) = &self.error else {
            return StatusCode::OK;
        };
        ErrorCode::from_code(error.code)
            .map(ErrorCode::status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes_and_statuses() {
        let cases = [
            (ErrorCode::ParseError, -32700, 400),
            (ErrorCode::InvalidRequest, -32600, 400),
            (ErrorCode::MethodNotFound, -32601, 404),
            (ErrorCode::InvalidParams, -32602, 400),
            (ErrorCode::InternalError, -32603, 500),
            (ErrorCode::Unauthorized, -32001, 401),
        ];
        for (code, number, status) in cases {
            assert_eq!(code.code(), number);
            assert_eq!(code.status().as_u16(), status);
            assert_eq!(JsonRpcResponse::error(None, code, "x").status().as_u16(), status);
        }
    }

    #[test]
    fn test_error_response_echoes_id() {
        let response = JsonRpcResponse::error(Some(json!(7)), ErrorCode::MethodNotFound, "nope");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_missing_id_serializes_as_null() {
        let response = JsonRpcResponse::success(None, json!({}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_notification_detection() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
                .unwrap();
        assert!(request.is_notification());
        assert!(request.id.is_none());
    }
}
