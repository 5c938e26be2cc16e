//! # Axum Helpers
//!
//! Shared HTTP plumbing for the Rulesmith services.
//!
//! - **[`errors`]**: [`AppError`] and the structured [`ErrorResponse`] body
//! - **[`extractors`]**: caller identity, UUID path and validated JSON extractors
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly, health/readiness, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig, FromEnv};
//!
//! let config = ServerConfig::from_env()?;
//! let router = create_router::<ApiDoc>(api_routes, &config)?
//!     .merge(health_router(app_info!()));
//! create_production_app(router, &config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{CurrentUser, USER_ID_HEADER, UuidPath, ValidatedJson};
pub use http::{create_cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, ShutdownCoordinator, create_production_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};
