use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use uuid::Uuid;

use super::entity;
use super::models::{ApiToken, NewToken, StoredToken};
use super::store::TokenStore;
use crate::error::TokenResult;

pub struct PgTokenStore {
    db: DatabaseConnection,
}

impl PgTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token: NewToken) -> TokenResult<ApiToken> {
        let model = entity::ActiveModel {
            id: Set(token.id),
            user_id: Set(token.user_id),
            name: Set(token.name),
            token_hash: Set(token.token_hash),
            revoked: Set(false),
            created_at: Set(Utc::now().into()),
            last_used_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        Ok(StoredToken::from(model).token)
    }

    async fn find_by_id(&self, id: Uuid) -> TokenResult<Option<StoredToken>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, user_id: Uuid) -> TokenResult<Vec<ApiToken>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(|m| StoredToken::from(m).token)
            .collect())
    }

    async fn revoke(&self, id: Uuid) -> TokenResult<bool> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Revoked, Expr::value(true))
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> TokenResult<()> {
        entity::Entity::update_many()
            .col_expr(entity::Column::LastUsedAt, Expr::value(at))
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
