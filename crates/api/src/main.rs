use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use autocheck_core::scoring::ScoringParams;
use autocheck_pipeline::ScoringPipeline;
use autocheck_upstream::{DetectorApi, RegistryApi, VehicleRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autocheck_api::config::ServerConfig;
use autocheck_api::router::build_app_router;
use autocheck_api::state::AppState;
use autocheck_api::storage::ImageStorage;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "autocheck_api=debug,autocheck_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = autocheck_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    autocheck_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    autocheck_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Detector + scoring pipeline ---
    let detector = DetectorApi::new(
        config.detector.url.clone(),
        Duration::from_secs(config.detector.timeout_secs),
    )
    .expect("Failed to build detector client");
    let params =
        ScoringParams::new(config.max_damage_score).expect("MAX_DAMAGE_SCORE must be positive");
    let pipeline = ScoringPipeline::new(Arc::new(detector), config.detector.concurrency, params);
    tracing::info!(
        url = %config.detector.url,
        concurrency = config.detector.concurrency,
        "Detector client configured"
    );

    // --- Registry ---
    let registry: Option<Arc<dyn VehicleRegistry>> = match &config.registry {
        Some(registry) => {
            let api = RegistryApi::new(
                registry.url.clone(),
                registry.token.clone(),
                Duration::from_secs(registry.timeout_secs),
            )
            .expect("Failed to build registry client");
            tracing::info!(url = %registry.url, "Registry lookups enabled");
            Some(Arc::new(api))
        }
        None => {
            tracing::info!("REGISTRY_URL not set, registry lookups disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline,
        registry,
        storage: Arc::new(ImageStorage::new(config.storage_root.clone())),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
