use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{ApiToken, NewToken, StoredToken};
use crate::error::TokenResult;

/// Persistence for API tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: NewToken) -> TokenResult<ApiToken>;

    async fn find_by_id(&self, id: Uuid) -> TokenResult<Option<StoredToken>>;

    /// Newest first, revoked tokens included
    async fn list(&self, user_id: Uuid) -> TokenResult<Vec<ApiToken>>;

    /// Returns false when the token does not exist
    async fn revoke(&self, id: Uuid) -> TokenResult<bool>;

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> TokenResult<()>;
}

/// In-memory implementation of TokenStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<Uuid, StoredToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, token: NewToken) -> TokenResult<ApiToken> {
        let api_token = ApiToken {
            id: token.id,
            user_id: token.user_id,
            name: token.name,
            revoked: false,
            created_at: Utc::now(),
            last_used_at: None,
        };

        self.tokens.write().await.insert(
            token.id,
            StoredToken {
                token: api_token.clone(),
                token_hash: token.token_hash,
            },
        );
        Ok(api_token)
    }

    async fn find_by_id(&self, id: Uuid) -> TokenResult<Option<StoredToken>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn list(&self, user_id: Uuid) -> TokenResult<Vec<ApiToken>> {
        let tokens = self.tokens.read().await;
        let mut owned: Vec<ApiToken> = tokens
            .values()
            .filter(|t| t.token.user_id == user_id)
            .map(|t| t.token.clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn revoke(&self, id: Uuid) -> TokenResult<bool> {
        match self.tokens.write().await.get_mut(&id) {
            Some(stored) => {
                stored.token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> TokenResult<()> {
        if let Some(stored) = self.tokens.write().await.get_mut(&id) {
            stored.token.last_used_at = Some(at);
        }
        Ok(())
    }
}
