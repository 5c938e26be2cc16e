use std::sync::Arc;

use async_trait::async_trait;
use domain_rag::{EmbeddingProvider, Metadata, Namespace, VectorIndex};
use serde_json::json;
use uuid::Uuid;

use crate::error::RuleResult;
use crate::models::Rule;

/// Metadata `type` of indexed rule versions
pub const RULE_TYPE: &str = "rule";

/// Mirrors rule versions into the vector index
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleIndexer: Send + Sync {
    /// Store `rule` under its own id
    async fn index_rule(&self, rule: &Rule) -> RuleResult<()>;

    async fn remove_rules(&self, user_id: Uuid, rule_ids: &[Uuid]) -> RuleResult<()>;
}

pub struct VectorRuleIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl VectorRuleIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }
}

fn rule_metadata(rule: &Rule) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("type".into(), json!(RULE_TYPE));
    metadata.insert("owner_id".into(), json!(rule.user_id.to_string()));
    metadata.insert("rule_id".into(), json!(rule.id.to_string()));
    metadata.insert("name".into(), json!(rule.name));
    metadata.insert("version".into(), json!(rule.version));
    metadata.insert("active".into(), json!(rule.active));
    if let Some(repository_id) = rule.repository_id {
        metadata.insert("project_ids".into(), json!([repository_id.to_string()]));
    }
    metadata.insert("preview".into(), json!(rule.content));
    metadata
}

#[async_trait]
impl RuleIndexer for VectorRuleIndexer {
    async fn index_rule(&self, rule: &Rule) -> RuleResult<()> {
        let namespace = Namespace::for_user(rule.user_id);
        let vector = self
            .embedder
            .embed(&format!("{}\n\n{}", rule.name, rule.content))
            .await?;

        self.index
            .upsert(&namespace, rule.id, vector, rule_metadata(rule))
            .await?;

        tracing::debug!(rule_id = %rule.id, version = rule.version, "Indexed rule");
        Ok(())
    }

    async fn remove_rules(&self, user_id: Uuid, rule_ids: &[Uuid]) -> RuleResult<()> {
        self.index
            .delete(&Namespace::for_user(user_id), rule_ids)
            .await?;
        Ok(())
    }
}
