use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::models::{ApiToken, CreateToken, CreatedToken, NewToken};
use super::secret;
use super::store::TokenStore;
use crate::error::{TokenError, TokenResult};

/// Issues, lists, revokes and checks API tokens
pub struct TokenService<S: TokenStore> {
    store: Arc<S>,
}

impl<S: TokenStore> Clone for TokenService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TokenStore> TokenService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// The plaintext is returned here and nowhere else
    pub async fn create(&self, owner: Uuid, input: CreateToken) -> TokenResult<CreatedToken> {
        let id = Uuid::now_v7();
        let plain = secret::generate_secret();
        let token_hash = secret::hash_secret(&plain)?;

        let token = self
            .store
            .insert(NewToken {
                id,
                user_id: owner,
                name: input.name,
                token_hash,
            })
            .await?;

        tracing::info!(token_id = %id, user_id = %owner, "Created API token");
        Ok(CreatedToken {
            token,
            secret: secret::format_token(id, &plain),
        })
    }

    pub async fn list(&self, owner: Uuid) -> TokenResult<Vec<ApiToken>> {
        self.store.list(owner).await
    }

    pub async fn revoke(&self, id: Uuid, owner: Uuid) -> TokenResult<()> {
        match self.store.find_by_id(id).await? {
            Some(stored) if stored.token.user_id == owner => {}
            _ => return Err(TokenError::NotFound(id)),
        }

        self.store.revoke(id).await?;
        tracing::info!(token_id = %id, user_id = %owner, "Revoked API token");
        Ok(())
    }

    /// Resolve a bearer token to its owner
    pub async fn authenticate(&self, bearer: &str) -> TokenResult<Uuid> {
        let (id, plain) = secret::parse_token(bearer)?;

        let stored = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TokenError::InvalidToken)?;
        if stored.token.revoked {
            tracing::debug!(token_id = %id, "Rejected revoked API token");
            return Err(TokenError::InvalidToken);
        }
        if !secret::verify_secret(plain, &stored.token_hash)? {
            return Err(TokenError::InvalidToken);
        }

        if let Err(e) = self.store.touch(id, Utc::now()).await {
            tracing::warn!(token_id = %id, error = %e, "Failed to record token use");
        }

        Ok(stored.token.user_id)
    }
}
