//! Relational storage plumbing for Rulesmith
//!
//! Rule lineages, linked repositories and API tokens live in PostgreSQL and are
//! accessed through SeaORM. This crate owns pool configuration, connection with
//! retry, migration running and the readiness probe. Entities and queries live
//! in the domain crates.
//!
//! # Features
//!
//! - `postgres` (default) - SeaORM connector and health probe
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let config = postgres::PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "rulesmith").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
