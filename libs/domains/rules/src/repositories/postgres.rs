use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use uuid::Uuid;

use super::entity;
use super::models::{ConnectRepository, Repository};
use super::store::RepositoryStore;
use crate::error::{RuleError, RuleResult};

pub struct PgRepositoryStore {
    db: DatabaseConnection,
}

impl PgRepositoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    async fn create(&self, user_id: Uuid, input: ConnectRepository) -> RuleResult<Repository> {
        let full_name = input.full_name.clone();
        let topics = serde_json::to_value(&input.topics)
            .map_err(|e| RuleError::Internal(format!("Failed to encode topics: {e}")))?;

        let model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            provider: Set(input.provider),
            external_id: Set(input.external_id),
            full_name: Set(input.full_name),
            description: Set(input.description),
            language: Set(input.language),
            topics: Set(topics),
            default_branch: Set(input.default_branch),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RuleError::DuplicateRepository(full_name),
            _ => RuleError::Database(e),
        })?;

        tracing::info!(repository_id = %model.id, %user_id, "Connected repository");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Repository>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, user_id: Uuid) -> RuleResult<Vec<Repository>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> RuleResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
