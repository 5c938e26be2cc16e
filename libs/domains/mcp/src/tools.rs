//! Tools exposed over `tools/list` and `tools/call`.
//!
//! The trait is sealed: the catalog is fixed by this crate.

use async_trait::async_trait;
use domain_rules::{RuleFilter, RuleRepository, RuleService};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{McpError, McpResult};

mod sealed {
    pub trait Sealed {}
}

#[async_trait]
pub trait Tool: sealed::Sealed + Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the `arguments` object
    fn input_schema(&self) -> Value;

    async fn call(&self, caller: Uuid, arguments: Value) -> McpResult<Value>;
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> McpResult<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::Internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ListRulesArgs {
    repository_id: Option<Uuid>,
    #[serde(default)]
    latest_only: bool,
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RuleIdArgs {
    rule_id: Uuid,
}

pub struct ListRulesTool<R: RuleRepository> {
    rules: RuleService<R>,
}

pub struct GetRuleTool<R: RuleRepository> {
    rules: RuleService<R>,
}

pub struct RuleHistoryTool<R: RuleRepository> {
    rules: RuleService<R>,
}

impl<R: RuleRepository> sealed::Sealed for ListRulesTool<R> {}
impl<R: RuleRepository> sealed::Sealed for GetRuleTool<R> {}
impl<R: RuleRepository> sealed::Sealed for RuleHistoryTool<R> {}

#[async_trait]
impl<R: RuleRepository + 'static> Tool for ListRulesTool<R> {
    fn name(&self) -> &'static str {
        "list_rules"
    }

    fn description(&self) -> &'static str {
        "Lists the caller's coding rules, newest first. Optionally restricted to one repository or to the latest version of each rule."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repository_id": {
                    "type": "string",
                    "format": "uuid",
                    "description": "Only rules generated for this repository"
                },
                "latest_only": {
                    "type": "boolean",
                    "description": "Hide versions that have been superseded (default: false)",
                    "default": false
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of rules (default: 50, max: 100)"
                }
            }
        })
    }

    async fn call(&self, caller: Uuid, arguments: Value) -> McpResult<Value> {
        let args: ListRulesArgs = parse_args(arguments)?;
        let filter = RuleFilter {
            repository_id: args.repository_id,
            latest_only: args.latest_only,
            limit: args.limit,
            offset: None,
        };

        let rules = self.rules.list(caller, filter).await?;
        to_value(&rules)
    }
}

#[async_trait]
impl<R: RuleRepository + 'static> Tool for GetRuleTool<R> {
    fn name(&self) -> &'static str {
        "get_rule"
    }

    fn description(&self) -> &'static str {
        "Fetches a single rule version by id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rule_id": { "type": "string", "format": "uuid" }
            },
            "required": ["rule_id"]
        })
    }

    async fn call(&self, caller: Uuid, arguments: Value) -> McpResult<Value> {
        let args: RuleIdArgs = parse_args(arguments)?;
        let rule = self.rules.get(args.rule_id, caller).await?;
        to_value(&rule)
    }
}

#[async_trait]
impl<R: RuleRepository + 'static> Tool for RuleHistoryTool<R> {
    fn name(&self) -> &'static str {
        "rule_history"
    }

    fn description(&self) -> &'static str {
        "Returns every version of a rule, oldest first. Any version id in the chain can be given."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rule_id": { "type": "string", "format": "uuid" }
            },
            "required": ["rule_id"]
        })
    }

    async fn call(&self, caller: Uuid, arguments: Value) -> McpResult<Value> {
        let args: RuleIdArgs = parse_args(arguments)?;
        let history = self.rules.history(args.rule_id, caller).await?;
        to_value(&history)
    }
}

/// The rule tools, in catalog order
pub fn rule_tools<R: RuleRepository + 'static>(rules: RuleService<R>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ListRulesTool {
            rules: rules.clone(),
        }),
        Box::new(GetRuleTool {
            rules: rules.clone(),
        }),
        Box::new(RuleHistoryTool { rules }),
    ]
}
