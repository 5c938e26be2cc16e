use axum::http::{HeaderName, HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::extractors::USER_ID_HEADER;

/// CORS layer for the dashboard origins.
///
/// An empty origin list yields a layer that allows no cross-origin callers;
/// editor tools and the stdio bridge are not browsers and are unaffected.
pub fn create_cors_layer(origins: &[String]) -> io::Result<CorsLayer> {
    let allowed = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(3600)))
}
