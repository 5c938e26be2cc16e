use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{RuleError, RuleResult};
use crate::models::{NewRuleVersion, Rule, RuleFilter};
use crate::repository::RuleRepository;

pub struct PgRuleRepository {
    db: DatabaseConnection,
}

impl PgRuleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// The unique index on `parent_id` turns a concurrent second successor into a conflict
fn map_insert_error(err: DbErr, parent_id: Option<Uuid>) -> RuleError {
    match (err.sql_err(), parent_id) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(parent_id)) => {
            RuleError::AlreadySuperseded(parent_id)
        }
        _ => RuleError::Database(err),
    }
}

#[async_trait]
impl RuleRepository for PgRuleRepository {
    async fn insert(&self, input: NewRuleVersion) -> RuleResult<Rule> {
        let parent_id = input.parent_id;
        let model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            content: Set(input.content),
            version: Set(input.version),
            active: Set(input.active),
            parent_id: Set(input.parent_id),
            repository_id: Set(input.repository_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_insert_error(e, parent_id))?;

        tracing::info!(rule_id = %model.id, version = model.version, "Inserted rule version");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> RuleResult<Option<Rule>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_child(&self, parent_id: Uuid) -> RuleResult<Option<Rule>> {
        let model = entity::Entity::find()
            .filter(entity::Column::ParentId.eq(parent_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, user_id: Uuid, filter: &RuleFilter) -> RuleResult<Vec<Rule>> {
        let mut query = entity::Entity::find().filter(entity::Column::UserId.eq(user_id));

        if let Some(repository_id) = filter.repository_id {
            query = query.filter(entity::Column::RepositoryId.eq(repository_id));
        }

        if filter.latest_only {
            let parents = Query::select()
                .column(entity::Column::ParentId)
                .from(entity::Entity)
                .and_where(entity::Column::ParentId.is_not_null())
                .to_owned();
            query = query.filter(entity::Column::Id.not_in_subquery(parents));
        }

        let models = query
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .limit(filter.limit())
            .offset(filter.offset())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> RuleResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = entity::Entity::delete_many()
            .filter(entity::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
