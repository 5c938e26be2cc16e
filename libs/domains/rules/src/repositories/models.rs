use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Source-code hosting service a repository lives on
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RepositoryProvider {
    #[sea_orm(string_value = "github")]
    Github,
    #[sea_orm(string_value = "gitlab")]
    Gitlab,
    #[sea_orm(string_value = "bitbucket")]
    Bitbucket,
}

/// A repository the user connected; its id scopes documentation chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Repository {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: RepositoryProvider,
    /// Id on the hosting provider
    pub external_id: String,
    /// e.g. `octo-org/widgets`
    pub full_name: String,
    pub description: String,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub default_branch: String,
    pub created_at: DateTime<Utc>,
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct ConnectRepository {
    pub provider: RepositoryProvider,
    #[validate(length(min = 1, max = 200))]
    pub external_id: String,
    #[validate(length(min = 1, max = 300))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub language: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub topics: Vec<String>,
    #[serde(default = "default_branch")]
    #[validate(length(min = 1, max = 255))]
    pub default_branch: String,
}
