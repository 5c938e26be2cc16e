use sea_orm::entity::prelude::*;

use super::models::RepositoryProvider;

/// Sea-ORM entity for the `repositories` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: RepositoryProvider,
    pub external_id: String,
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub language: Option<String>,
    pub topics: Json,
    pub default_branch: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "repositories";
}

impl From<Model> for super::models::Repository {
    fn from(model: Model) -> Self {
        let topics: Vec<String> = serde_json::from_value(model.topics).unwrap_or_default();

        Self {
            id: model.id,
            user_id: model.user_id,
            provider: model.provider,
            external_id: model.external_id,
            full_name: model.full_name,
            description: model.description,
            language: model.language,
            topics,
            default_branch: model.default_branch,
            created_at: model.created_at.into(),
        }
    }
}
