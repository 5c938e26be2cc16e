pub use sea_orm_migration::prelude::*;

mod m20260901_000000_create_repositories;
mod m20260901_000001_create_rules;
mod m20260905_000000_create_api_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000000_create_repositories::Migration),
            Box::new(m20260901_000001_create_rules::Migration),
            Box::new(m20260905_000000_create_api_tokens::Migration),
        ]
    }
}
