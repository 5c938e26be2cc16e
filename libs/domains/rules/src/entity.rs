use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `rules` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub version: i32,
    pub active: bool,
    #[sea_orm(unique)]
    pub parent_id: Option<Uuid>,
    pub repository_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "rules";
}

impl From<Model> for crate::models::Rule {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            content: model.content,
            version: model.version,
            active: model.active,
            parent_id: model.parent_id,
            repository_id: model.repository_id,
            created_at: model.created_at.into(),
        }
    }
}
