use std::sync::Arc;

use autocheck_pipeline::ScoringPipeline;
use autocheck_upstream::VehicleRegistry;

use crate::config::ServerConfig;
use crate::storage::ImageStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: autocheck_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Scoring pass bound to the configured detector.
    pub pipeline: ScoringPipeline,
    /// Registry client; `None` when `REGISTRY_URL` is unset.
    pub registry: Option<Arc<dyn VehicleRegistry>>,
    /// On-disk image store.
    pub storage: Arc<ImageStorage>,
}
