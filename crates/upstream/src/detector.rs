//! Defect detector client.
//!
//! The detector takes one image per request (`POST /find_defects`,
//! multipart field `file`) and answers with already matched
//! `(car_part, defect_type, severity, confidence)` tuples. Readiness is
//! reported by `GET /healthcheck`.

use std::time::Duration;

use async_trait::async_trait;
use autocheck_core::observation::DefectObservation;
use serde::Deserialize;

use crate::error::UpstreamError;
use crate::http::{parse_response, send};

/// One image handed to the detector.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Response of `POST /find_defects`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionReport {
    pub report: Vec<DefectObservation>,
    #[serde(default)]
    pub total_defects: usize,
    #[serde(default)]
    pub processing_time_ms: f64,
}

/// Response of `GET /healthcheck`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorHealth {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub gpu_available: bool,
}

impl DetectorHealth {
    /// Healthy and with models loaded.
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.models_loaded
    }
}

/// Anything that can turn an image into defect observations.
#[async_trait]
pub trait DefectDetector: Send + Sync {
    /// Health check: `true` when the detector can serve requests.
    async fn is_ready(&self) -> Result<bool, UpstreamError>;

    /// Detect defects on a single image.
    async fn detect(&self, image: &ImagePayload) -> Result<Vec<DefectObservation>, UpstreamError>;

    /// Check and turn a negative answer into [`UpstreamError::NotReady`].
    async fn ensure_ready(&self) -> Result<(), UpstreamError> {
        if self.is_ready().await? {
            Ok(())
        } else {
            Err(UpstreamError::NotReady(
                "detector reports models not loaded".to_string(),
            ))
        }
    }
}

/// HTTP client for the detector service.
pub struct DetectorApi {
    client: reqwest::Client,
    api_url: String,
}

impl DetectorApi {
    /// Create a client whose requests time out after `timeout`.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:4070`.
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the raw health report.
    pub async fn health(&self) -> Result<DetectorHealth, UpstreamError> {
        let response = send(self.client.get(format!("{}/healthcheck", self.api_url))).await?;
        parse_response(response).await
    }

    /// Submit one image and return the full detection report.
    pub async fn find_defects(&self, image: &ImagePayload) -> Result<DetectionReport, UpstreamError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = send(
            self.client
                .post(format!("{}/find_defects", self.api_url))
                .multipart(form),
        )
        .await?;

        parse_response(response).await
    }
}

#[async_trait]
impl DefectDetector for DetectorApi {
    async fn is_ready(&self) -> Result<bool, UpstreamError> {
        let health = self.health().await?;
        tracing::debug!(
            status = %health.status,
            models_loaded = health.models_loaded,
            gpu_available = health.gpu_available,
            "Detector health check"
        );
        Ok(health.is_ready())
    }

    async fn detect(&self, image: &ImagePayload) -> Result<Vec<DefectObservation>, UpstreamError> {
        let report = self.find_defects(image).await?;
        tracing::debug!(
            file = %image.file_name,
            defects = report.report.len(),
            processing_time_ms = report.processing_time_ms,
            "Detector report received"
        );
        Ok(report.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use autocheck_core::defects::DefectType;
    use autocheck_core::parts::{CarPart, PartKind};
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn payload() -> ImagePayload {
        ImagePayload {
            file_name: "1.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    async fn find_defects(mut multipart: Multipart) -> (StatusCode, Json<serde_json::Value>) {
        let mut saw_file = false;
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                saw_file = field.file_name() == Some("1.jpg");
            }
        }
        if !saw_file {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"detail": "no file"})),
            );
        }
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "report": [
                    {"defect_type": "Dent", "car_part": "Front-door", "severity": 4.5, "confidence": 0.89},
                    {"defect_type": "Hail", "car_part": "Spoiler", "severity": 5.0, "confidence": 0.5}
                ],
                "total_defects": 2,
                "processing_time_ms": 12.5
            })),
        )
    }

    // -- detect --

    #[tokio::test]
    async fn detect_parses_report_with_unknown_labels() {
        let url = spawn(Router::new().route("/find_defects", post(find_defects))).await;
        let api = DetectorApi::new(url, Duration::from_secs(5)).unwrap();

        let observations = api.detect(&payload()).await.unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].part, CarPart::new(PartKind::FrontDoor));
        assert_eq!(observations[0].defect_type, DefectType::Dent);
        assert_eq!(observations[0].severity, 4.5);
        assert_eq!(observations[1].part, CarPart::UNMAPPED);
        assert_eq!(observations[1].defect_type, DefectType::Unrecognized);
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let router = Router::new().route(
            "/find_defects",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "models are not loaded") }),
        );
        let api = DetectorApi::new(spawn(router).await, Duration::from_secs(5)).unwrap();

        let err = api.detect(&payload()).await.unwrap_err();
        assert_matches!(err, UpstreamError::ApiError { status: 500, ref body } if body.contains("not loaded"));
    }

    #[tokio::test]
    async fn slow_detector_times_out() {
        let router = Router::new().route(
            "/find_defects",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let api = DetectorApi::new(spawn(router).await, Duration::from_millis(100)).unwrap();

        assert_matches!(api.detect(&payload()).await, Err(UpstreamError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_detector_is_request_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = DetectorApi::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        assert_matches!(api.is_ready().await, Err(UpstreamError::Request(_)));
    }

    // -- health --

    #[tokio::test]
    async fn health_requires_loaded_models() {
        let router = Router::new().route(
            "/healthcheck",
            get(|| async {
                Json(serde_json::json!({
                    "status": "healthy",
                    "timestamp": "2026-01-01T00:00:00Z",
                    "version": "1.0.0",
                    "models_loaded": false,
                    "gpu_available": false
                }))
            }),
        );
        let api = DetectorApi::new(spawn(router).await, Duration::from_secs(5)).unwrap();

        assert!(!api.is_ready().await.unwrap());
        assert_matches!(api.ensure_ready().await, Err(UpstreamError::NotReady(_)));
    }

    #[tokio::test]
    async fn healthy_detector_is_ready() {
        let router = Router::new().route(
            "/healthcheck",
            get(|| async {
                Json(serde_json::json!({
                    "status": "healthy",
                    "timestamp": "2026-01-01T00:00:00Z",
                    "version": "1.0.0",
                    "models_loaded": true,
                    "gpu_available": true
                }))
            }),
        );
        let api = DetectorApi::new(format!("{}/", spawn(router).await), Duration::from_secs(5)).unwrap();

        assert!(api.ensure_ready().await.is_ok());
    }
}
