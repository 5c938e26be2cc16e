use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::models::{ConnectRepository, Repository};
use super::store::RepositoryStore;
use crate::error::{RuleError, RuleResult};

pub struct RepositoryService<S: RepositoryStore> {
    store: Arc<S>,
}

impl<S: RepositoryStore> Clone for RepositoryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RepositoryStore> RepositoryService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub async fn connect(&self, owner: Uuid, input: ConnectRepository) -> RuleResult<Repository> {
        input
            .validate()
            .map_err(|e| RuleError::Validation(e.to_string()))?;
        self.store.create(owner, input).await
    }

    pub async fn list(&self, owner: Uuid) -> RuleResult<Vec<Repository>> {
        self.store.list(owner).await
    }

    /// Repositories of other users are reported as missing
    pub async fn get(&self, id: Uuid, owner: Uuid) -> RuleResult<Repository> {
        self.store
            .find_by_id(id)
            .await?
            .filter(|r| r.user_id == owner)
            .ok_or(RuleError::RepositoryNotFound(id))
    }

    /// Rules keep existing with their repository link cleared
    pub async fn disconnect(&self, id: Uuid, owner: Uuid) -> RuleResult<()> {
        self.get(id, owner).await?;
        self.store.delete(id).await?;
        tracing::info!(repository_id = %id, user_id = %owner, "Disconnected repository");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::models::RepositoryProvider;
    use crate::repositories::store::{InMemoryRepositoryStore, MockRepositoryStore};
    use test_utils::TestDataBuilder;

    fn input(external_id: &str) -> ConnectRepository {
        ConnectRepository {
            provider: RepositoryProvider::Github,
            external_id: external_id.to_string(),
            full_name: format!("octo/{external_id}"),
            description: "Widgets".into(),
            language: Some("Rust".into()),
            topics: vec!["cli".into()],
            default_branch: "main".into(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_connection_conflicts() {
        let owner = TestDataBuilder::from_test_name("repo_duplicate").user_id();
        let service = RepositoryService::new(InMemoryRepositoryStore::new());

        service.connect(owner, input("42")).await.unwrap();
        let err = service.connect(owner, input("42")).await.unwrap_err();
        assert!(matches!(err, RuleError::DuplicateRepository(_)));
    }

    #[tokio::test]
    async fn test_same_repository_for_two_users() {
        let builder = TestDataBuilder::from_test_name("repo_two_users");
        let service = RepositoryService::new(InMemoryRepositoryStore::new());

        service.connect(builder.user(0), input("42")).await.unwrap();
        service.connect(builder.user(1), input("42")).await.unwrap();
        assert_eq!(service.list(builder.user(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_hides_other_users_repositories() {
        let builder = TestDataBuilder::from_test_name("repo_ownership");
        let service = RepositoryService::new(InMemoryRepositoryStore::new());
        let repo = service.connect(builder.user(0), input("1")).await.unwrap();

        assert!(matches!(
            service.get(repo.id, builder.user(1)).await,
            Err(RuleError::RepositoryNotFound(_))
        ));
        assert!(service.disconnect(repo.id, builder.user(1)).await.is_err());
        service.disconnect(repo.id, builder.user(0)).await.unwrap();
        assert!(service.list(builder.user(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let mut store = MockRepositoryStore::new();
        store.expect_create().never();
        let service = RepositoryService::new(store);

        let mut bad = input("1");
        bad.full_name = String::new();
        assert!(matches!(
            service.connect(uuid::Uuid::nil(), bad).await,
            Err(RuleError::Validation(_))
        ));
    }
}
