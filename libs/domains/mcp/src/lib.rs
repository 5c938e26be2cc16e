//! Protocol endpoint for editor integrations.
//!
//! A small JSON-RPC 2.0 surface (`initialize`, `ping`, `tools/list`,
//! `tools/call`) over HTTP that exposes the caller's rules as tools, plus the
//! API tokens editor integrations authenticate with.
//!
//! ```ignore
//! let server = McpServer::new(rule_tools(rule_service));
//! let app = domain_mcp::router(server, Some(Arc::new(token_service)));
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod jsonrpc;
pub mod server;
pub mod tokens;
pub mod tools;

pub use auth::{BearerAuthenticator, resolve_caller};
pub use error::{McpError, McpResult, TokenError, TokenResult};
pub use handlers::router;
pub use jsonrpc::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{McpServer, PROTOCOL_VERSION};
pub use tools::{Tool, rule_tools};
