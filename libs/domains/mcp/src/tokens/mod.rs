//! API tokens let editor integrations call the protocol endpoint without the
//! dashboard's identity header.

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod secret;
pub mod service;
pub mod store;

pub use models::{ApiToken, CreateToken, CreatedToken};
pub use postgres::PgTokenStore;
pub use service::TokenService;
pub use store::{InMemoryTokenStore, TokenStore};
