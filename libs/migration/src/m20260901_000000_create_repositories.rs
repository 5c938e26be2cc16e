use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Repositories::Id))
                    .col(uuid(Repositories::UserId))
                    .col(string(Repositories::Provider))
                    .col(string(Repositories::ExternalId))
                    .col(string(Repositories::FullName))
                    .col(text(Repositories::Description).default(""))
                    .col(string_null(Repositories::Language))
                    .col(json(Repositories::Topics).default("[]"))
                    .col(string(Repositories::DefaultBranch).default("main"))
                    .col(
                        timestamp_with_time_zone(Repositories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One link per upstream repository per user
        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_user_provider_external")
                    .table(Repositories::Table)
                    .col(Repositories::UserId)
                    .col(Repositories::Provider)
                    .col(Repositories::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_user_id")
                    .table(Repositories::Table)
                    .col(Repositories::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Repositories {
    Table,
    Id,
    UserId,
    Provider,
    ExternalId,
    FullName,
    Description,
    Language,
    Topics,
    DefaultBranch,
    CreatedAt,
}
