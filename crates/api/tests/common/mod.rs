use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autocheck_core::observation::DefectObservation;
use autocheck_core::registry::{Fine, RegistryReport, RegisteredVehicle, VehicleHistory};
use autocheck_core::scoring::ScoringParams;
use autocheck_pipeline::ScoringPipeline;
use autocheck_upstream::{DefectDetector, ImagePayload, UpstreamError, VehicleRegistry};
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use autocheck_api::config::{DetectorConfig, ServerConfig};
use autocheck_api::router::build_app_router;
use autocheck_api::state::AppState;
use autocheck_api::storage::ImageStorage;

/// Smallest byte string that sniffs as PNG.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

pub const TEST_VIN: &str = "JN1TCAT32U0123456";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Detector that answers every image with the same observations.
#[derive(Default)]
pub struct ScriptedDetector {
    pub down: AtomicBool,
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
    observations: Mutex<Vec<DefectObservation>>,
}

impl ScriptedDetector {
    pub fn answer_with(&self, observations: Vec<DefectObservation>) {
        *self.observations.lock().unwrap() = observations;
    }
}

#[async_trait]
impl DefectDetector for ScriptedDetector {
    async fn is_ready(&self) -> Result<bool, UpstreamError> {
        Ok(!self.down.load(Ordering::SeqCst))
    }

    async fn detect(&self, _image: &ImagePayload) -> Result<Vec<DefectObservation>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::ApiError {
                status: 500,
                body: "inference failed".into(),
            });
        }
        Ok(self.observations.lock().unwrap().clone())
    }
}

/// Registry returning one fixed report.
pub struct StaticRegistry;

#[async_trait]
impl VehicleRegistry for StaticRegistry {
    async fn fetch_report(&self, vin: &str) -> RegistryReport {
        RegistryReport {
            vin: vin.to_string(),
            history: Some(VehicleHistory {
                vehicle: Some(RegisteredVehicle {
                    model: Some("NISSAN X-TRAIL".into()),
                    year: Some("2012".into()),
                    ..Default::default()
                }),
                ownership_periods: vec![Default::default(), Default::default()],
            }),
            fines: Some(vec![Fine {
                amount: Some(750.0),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_root: storage_root.to_path_buf(),
        detector: DetectorConfig {
            url: "http://detector.invalid".to_string(),
            timeout_secs: 5,
            concurrency: 2,
        },
        registry: None,
        max_damage_score: 12.0,
    }
}

/// Everything a test needs to drive the router and inspect side effects.
pub struct TestApp {
    pub pool: PgPool,
    pub detector: Arc<ScriptedDetector>,
    pub storage: tempfile::TempDir,
    pub with_registry: bool,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            detector: Arc::new(ScriptedDetector::default()),
            storage: tempfile::tempdir().expect("temp dir"),
            with_registry: false,
        }
    }

    pub fn with_registry(mut self) -> Self {
        self.with_registry = true;
        self
    }

    /// A fresh router over the shared pool, detector and storage.
    ///
    /// Mirrors `main.rs` so tests exercise the production middleware stack.
    pub fn router(&self) -> Router {
        let config = test_config(self.storage.path());
        let registry: Option<Arc<dyn VehicleRegistry>> = if self.with_registry {
            Some(Arc::new(StaticRegistry))
        } else {
            None
        };

        let state = AppState {
            pool: self.pool.clone(),
            config: Arc::new(config.clone()),
            pipeline: ScoringPipeline::new(self.detector.clone(), 2, ScoringParams::default()),
            registry,
            storage: Arc::new(ImageStorage::new(self.storage.path())),
        };

        build_app_router(state, &config)
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a multipart body with one `files` field per `(filename, bytes)`.
pub async fn post_files(app: Router, uri: &str, files: &[(&str, &[u8])]) -> Response {
    let boundary = "autocheck-test-boundary";
    let mut body = Vec::new();
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an analysis through the API and return its id.
pub async fn create_analysis(app: &TestApp, vin: Option<&str>) -> i64 {
    let response = post_json(
        app.router(),
        "/api/v1/analyses",
        serde_json::json!({ "vin": vin }),
    )
    .await;
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("analysis id")
}
