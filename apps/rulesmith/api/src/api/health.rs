//! Readiness probes for the database and the vector index.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| format!("Database ping failed: {e}"))
            }),
        ),
        (
            "vector_index",
            Box::pin(async {
                state
                    .vector_index
                    .health()
                    .await
                    .map_err(|e| format!("Vector index unreachable: {e}"))
            }),
        ),
    ];

    run_health_checks(checks).await.into_response()
}
