use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260901_000000_create_repositories::Repositories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Rows are append-only: an update inserts a child row pointing at its parent.
        manager
            .create_table(
                Table::create()
                    .table(Rules::Table)
                    .if_not_exists()
                    .col(pk_uuid(Rules::Id))
                    .col(uuid(Rules::UserId))
                    .col(string(Rules::Name))
                    .col(text(Rules::Content))
                    .col(integer(Rules::Version).default(1))
                    .col(boolean(Rules::Active).default(true))
                    .col(uuid_null(Rules::ParentId))
                    .col(uuid_null(Rules::RepositoryId))
                    .col(
                        timestamp_with_time_zone(Rules::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rules_parent_id")
                            .from(Rules::Table, Rules::ParentId)
                            .to(Rules::Table, Rules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rules_repository_id")
                            .from(Rules::Table, Rules::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // A version has at most one successor, so history stays linear
        manager
            .create_index(
                Index::create()
                    .name("idx_rules_parent_id_unique")
                    .table(Rules::Table)
                    .col(Rules::ParentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rules_user_id_created_at")
                    .table(Rules::Table)
                    .col(Rules::UserId)
                    .col(Rules::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rules_repository_id")
                    .table(Rules::Table)
                    .col(Rules::RepositoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rules {
    Table,
    Id,
    UserId,
    Name,
    Content,
    Version,
    Active,
    ParentId,
    RepositoryId,
    CreatedAt,
}
