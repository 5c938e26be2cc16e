use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::error::{RuleError, RuleResult};
use crate::indexing::RuleIndexer;
use crate::models::{CreateRule, NewRuleVersion, Rule, RuleFilter, UpdateRule};
use crate::repository::RuleRepository;

/// Guards against a corrupted parent chain looping forever
const MAX_LINEAGE: usize = 10_000;

/// Rule versioning: every change inserts a new record linked to its predecessor
pub struct RuleService<R: RuleRepository> {
    repository: Arc<R>,
    indexer: Option<Arc<dyn RuleIndexer>>,
}

impl<R: RuleRepository> Clone for RuleService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            indexer: self.indexer.clone(),
        }
    }
}

impl<R: RuleRepository + 'static> RuleService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            indexer: None,
        }
    }

    /// Mirror every new version into the vector index, best effort
    pub fn with_indexer(mut self, indexer: Arc<dyn RuleIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Insert version 1 of a new rule
    pub async fn create(&self, owner: Uuid, input: CreateRule) -> RuleResult<Rule> {
        input
            .validate()
            .map_err(|e| RuleError::Validation(e.to_string()))?;

        let rule = self
            .repository
            .insert(NewRuleVersion::first(owner, input))
            .await?;

        tracing::info!(rule_id = %rule.id, user_id = %owner, "Created rule");
        self.spawn_reindex(&rule);
        Ok(rule)
    }

    /// Get a rule version owned by `owner`
    pub async fn get(&self, id: Uuid, owner: Uuid) -> RuleResult<Rule> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|rule| rule.user_id == owner)
            .ok_or(RuleError::NotFound(id))
    }

    pub async fn list(&self, owner: Uuid, filter: RuleFilter) -> RuleResult<Vec<Rule>> {
        self.repository.list(owner, &filter).await
    }

    /// Insert the successor of `id`. Only the newest version of a rule can be updated.
    pub async fn update(&self, id: Uuid, owner: Uuid, patch: UpdateRule) -> RuleResult<Rule> {
        patch
            .validate()
            .map_err(|e| RuleError::Validation(e.to_string()))?;

        let previous = self.get(id, owner).await?;

        if self.repository.find_child(previous.id).await?.is_some() {
            return Err(RuleError::AlreadySuperseded(previous.id));
        }

        let rule = self.repository.insert(previous.next_version(patch)).await?;

        tracing::info!(
            rule_id = %rule.id,
            parent_id = %previous.id,
            version = rule.version,
            "Created rule version"
        );
        self.spawn_reindex(&rule);
        Ok(rule)
    }

    /// Every version of the rule `id` belongs to, oldest first
    pub async fn history(&self, id: Uuid, owner: Uuid) -> RuleResult<Vec<Rule>> {
        let rule = self.get(id, owner).await?;

        let mut ancestors = Vec::new();
        let mut cursor = rule.parent_id;
        while let Some(parent_id) = cursor {
            let parent = self
                .repository
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| RuleError::Internal(format!("missing parent version {parent_id}")))?;
            cursor = parent.parent_id;
            ancestors.push(parent);
            check_lineage_len(ancestors.len())?;
        }
        ancestors.reverse();

        let mut lineage = ancestors;
        let mut current = rule;
        loop {
            let next = self.repository.find_child(current.id).await?;
            lineage.push(current);
            check_lineage_len(lineage.len())?;
            match next {
                Some(child) => current = child,
                None => break,
            }
        }

        Ok(lineage)
    }

    /// Remove every version of the rule; returns how many were deleted
    pub async fn delete(&self, id: Uuid, owner: Uuid) -> RuleResult<u64> {
        let ids: Vec<Uuid> = self.history(id, owner).await?.iter().map(|r| r.id).collect();
        let deleted = self.repository.delete_many(&ids).await?;

        tracing::info!(rule_id = %id, versions = deleted, "Deleted rule");

        if let Some(indexer) = self.indexer.clone() {
            tokio::spawn(async move {
                if let Err(e) = indexer.remove_rules(owner, &ids).await {
                    tracing::warn!(rule_id = %id, error = %e, "Failed to remove rule vectors");
                }
            });
        }

        Ok(deleted)
    }

    /// The relational write is the source of truth; index failures are only logged
    fn spawn_reindex(&self, rule: &Rule) {
        let Some(indexer) = self.indexer.clone() else {
            return;
        };
        let service = self.clone();
        let rule = rule.clone();

        tokio::spawn(async move {
            if let Err(e) = service.reindex(indexer.as_ref(), &rule).await {
                tracing::warn!(rule_id = %rule.id, error = %e, "Failed to re-index rule");
            }
        });
    }

    /// Index `rule`, then drop every version of its lineage except the newest.
    /// The lineage is read after the upsert, so tasks may finish in any order.
    async fn reindex(&self, indexer: &dyn RuleIndexer, rule: &Rule) -> RuleResult<()> {
        indexer.index_rule(rule).await?;

        let stale: Vec<Uuid> = match self.history(rule.id, rule.user_id).await {
            Ok(lineage) => {
                let newest = lineage.last().map(|r| r.id);
                lineage
                    .iter()
                    .map(|r| r.id)
                    .filter(|id| Some(*id) != newest)
                    .collect()
            }
            // deleted while the task was running
            Err(RuleError::NotFound(_)) => vec![rule.id],
            Err(e) => return Err(e),
        };

        if !stale.is_empty() {
            indexer.remove_rules(rule.user_id, &stale).await?;
        }
        Ok(())
    }
}

fn check_lineage_len(len: usize) -> RuleResult<()> {
    if len > MAX_LINEAGE {
        return Err(RuleError::Internal(
            "rule history is too long or cyclic".to_string(),
        ));
    }
    Ok(())
}
