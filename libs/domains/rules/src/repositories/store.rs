use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{ConnectRepository, Repository};
use crate::error::{RuleError, RuleResult};

/// Persistence for connected repositories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Fails with `DuplicateRepository` when the user already connected it
    async fn create(&self, user_id: Uuid, input: ConnectRepository) -> RuleResult<Repository>;

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Repository>>;

    /// Newest first
    async fn list(&self, user_id: Uuid) -> RuleResult<Vec<Repository>>;

    async fn delete(&self, id: Uuid) -> RuleResult<bool>;
}

/// In-memory implementation of RepositoryStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepositoryStore {
    repositories: Arc<RwLock<HashMap<Uuid, Repository>>>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn create(&self, user_id: Uuid, input: ConnectRepository) -> RuleResult<Repository> {
        let mut repositories = self.repositories.write().await;

        let duplicate = repositories.values().any(|r| {
            r.user_id == user_id && r.provider == input.provider && r.external_id == input.external_id
        });
        if duplicate {
            return Err(RuleError::DuplicateRepository(input.full_name));
        }

        let repository = Repository {
            id: Uuid::now_v7(),
            user_id,
            provider: input.provider,
            external_id: input.external_id,
            full_name: input.full_name,
            description: input.description,
            language: input.language,
            topics: input.topics,
            default_branch: input.default_branch,
            created_at: Utc::now(),
        };
        repositories.insert(repository.id, repository.clone());
        Ok(repository)
    }

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Repository>> {
        Ok(self.repositories.read().await.get(&id).cloned())
    }

    async fn list(&self, user_id: Uuid) -> RuleResult<Vec<Repository>> {
        let mut owned: Vec<Repository> = self
            .repositories
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn delete(&self, id: Uuid) -> RuleResult<bool> {
        Ok(self.repositories.write().await.remove(&id).is_some())
    }
}
