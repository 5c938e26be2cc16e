use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

/// One immutable version of a coding rule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Rule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    /// 1 for the first version, +1 per update
    pub version: i32,
    pub active: bool,
    /// Previous version; `None` only for version 1
    pub parent_id: Option<Uuid>,
    pub repository_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// The record an update inserts: unspecified fields carry over from `self`
    pub fn next_version(&self, patch: UpdateRule) -> NewRuleVersion {
        NewRuleVersion {
            user_id: self.user_id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            content: patch.content.unwrap_or_else(|| self.content.clone()),
            version: self.version + 1,
            active: patch.active.unwrap_or(self.active),
            parent_id: Some(self.id),
            repository_id: self.repository_id,
        }
    }
}

/// Everything the store needs to insert a rule version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRuleVersion {
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    pub version: i32,
    pub active: bool,
    pub parent_id: Option<Uuid>,
    pub repository_id: Option<Uuid>,
}

impl NewRuleVersion {
    pub fn first(user_id: Uuid, input: CreateRule) -> Self {
        Self {
            user_id,
            name: input.name,
            content: input.content,
            version: 1,
            active: input.active,
            parent_id: None,
            repository_id: input.repository_id,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateRule {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100000))]
    pub content: String,
    #[serde(default)]
    pub repository_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Omitted fields keep the previous version's value
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateRule {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100000))]
    pub content: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RuleFilter {
    pub repository_id: Option<Uuid>,
    /// Only versions that have no successor
    #[serde(default)]
    pub latest_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl RuleFilter {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}
