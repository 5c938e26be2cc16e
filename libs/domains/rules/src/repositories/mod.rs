//! Source repositories a user connected, and the metadata rule generation uses.

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod service;
pub mod store;

pub use models::{ConnectRepository, Repository, RepositoryProvider};
pub use postgres::PgRepositoryStore;
pub use service::RepositoryService;
pub use store::{InMemoryRepositoryStore, RepositoryStore};
