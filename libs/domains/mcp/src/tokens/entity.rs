use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `api_tokens` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub token_hash: String,
    pub revoked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub last_used_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "tokens";
}

impl From<Model> for super::models::StoredToken {
    fn from(model: Model) -> Self {
        Self {
            token: super::models::ApiToken {
                id: model.id,
                user_id: model.user_id,
                name: model.name,
                revoked: model.revoked,
                created_at: model.created_at.into(),
                last_used_at: model.last_used_at.map(Into::into),
            },
            token_hash: model.token_hash,
        }
    }
}
