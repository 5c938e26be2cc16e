//! Rules domain: append-only rule versions, connected repositories and
//! rule generation.
//!
//! A rule is never edited in place. [`RuleService::update`] inserts a new
//! record with `version + 1` and `parent_id` pointing at the previous one, so
//! the versions of a rule always form a single linear chain.

pub mod entity;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod indexing;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod repository;
pub mod service;

pub use error::{RuleError, RuleResult};
pub use generator::{GenerateRules, GeneratedRule, GenerationSource, RuleGenerator};
pub use handlers::ApiDoc;
pub use indexing::{RuleIndexer, VectorRuleIndexer};
pub use models::{CreateRule, Rule, RuleFilter, UpdateRule};
pub use postgres::PgRuleRepository;
pub use repository::{InMemoryRuleRepository, RuleRepository};
pub use service::RuleService;
