use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is reachable, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the defect detector answers its health check as ready.
    pub detector_ready: bool,
}

/// GET /health -- returns service, database and detector health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, detector_ready) = tokio::join!(
        autocheck_db::health_check(&state.pool),
        state.pipeline.detector_ready()
    );
    let db_healthy = db.is_ok();

    let status = if db_healthy && detector_ready {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        detector_ready,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
