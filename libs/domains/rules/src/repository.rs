use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RuleError, RuleResult};
use crate::models::{NewRuleVersion, Rule, RuleFilter};

/// Append-only persistence for rule versions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Insert a version. Fails with `AlreadySuperseded` if its parent already has a child.
    async fn insert(&self, input: NewRuleVersion) -> RuleResult<Rule>;

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Rule>>;

    /// The version whose parent is `parent_id`, if any
    async fn find_child(&self, parent_id: Uuid) -> RuleResult<Option<Rule>>;

    /// A user's rules, newest first
    async fn list(&self, user_id: Uuid, filter: &RuleFilter) -> RuleResult<Vec<Rule>>;

    /// Returns the number of rows removed
    async fn delete_many(&self, ids: &[Uuid]) -> RuleResult<u64>;
}

/// In-memory implementation of RuleRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRuleRepository {
    rules: Arc<RwLock<HashMap<Uuid, Rule>>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn insert(&self, input: NewRuleVersion) -> RuleResult<Rule> {
        let mut rules = self.rules.write().await;

        if let Some(parent_id) = input.parent_id {
            if rules.values().any(|r| r.parent_id == Some(parent_id)) {
                return Err(RuleError::AlreadySuperseded(parent_id));
            }
        }

        let rule = Rule {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            name: input.name,
            content: input.content,
            version: input.version,
            active: input.active,
            parent_id: input.parent_id,
            repository_id: input.repository_id,
            created_at: Utc::now(),
        };
        rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Rule>> {
        Ok(self.rules.read().await.get(&id).cloned())
    }

    async fn find_child(&self, parent_id: Uuid) -> RuleResult<Option<Rule>> {
        Ok(self
            .rules
            .read()
            .await
            .values()
            .find(|r| r.parent_id == Some(parent_id))
            .cloned())
    }

    async fn list(&self, user_id: Uuid, filter: &RuleFilter) -> RuleResult<Vec<Rule>> {
        let rules = self.rules.read().await;

        let mut matching: Vec<Rule> = rules
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| filter.repository_id.is_none() || r.repository_id == filter.repository_id)
            .filter(|r| !filter.latest_only || !rules.values().any(|c| c.parent_id == Some(r.id)))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> RuleResult<u64> {
        let mut rules = self.rules.write().await;
        Ok(ids.iter().filter(|id| rules.remove(id).is_some()).count() as u64)
    }
}
