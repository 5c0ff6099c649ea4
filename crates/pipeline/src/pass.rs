//! Scoring pass: collect observations from the detector, then score them.

use std::path::PathBuf;
use std::sync::Arc;

use autocheck_core::observation::DefectObservation;
use autocheck_core::scoring::{score_observations, ScoringParams, VehicleCondition};
use autocheck_upstream::{DefectDetector, ImagePayload, UpstreamError};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::PipelineError;

/// An uploaded image on disk, in processing order.
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub path: PathBuf,
    pub content_type: String,
}

/// Result of a completed scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringOutcome {
    pub condition: VehicleCondition,
    pub images_processed: usize,
    pub images_skipped: usize,
}

/// Why a single image contributed nothing.
#[derive(Debug, thiserror::Error)]
enum ImageFailure {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Detector(#[from] UpstreamError),
}

/// Runs scoring passes against one detector.
#[derive(Clone)]
pub struct ScoringPipeline {
    detector: Arc<dyn DefectDetector>,
    concurrency: usize,
    params: ScoringParams,
}

impl ScoringPipeline {
    /// `concurrency` is clamped to at least 1.
    pub fn new(detector: Arc<dyn DefectDetector>, concurrency: usize, params: ScoringParams) -> Self {
        Self {
            detector,
            concurrency: concurrency.max(1),
            params,
        }
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Check the detector without running a pass.
    pub async fn detector_ready(&self) -> bool {
        match self.detector.is_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::debug!(error = %e, "Detector health check failed");
                false
            }
        }
    }

    /// Score an analysis from its staged images.
    ///
    /// With no images the detector is not contacted and the vacuous
    /// pristine result is returned. Otherwise the detector must pass its
    /// health check and accept at least one image.
    pub async fn run(&self, images: &[StagedImage]) -> Result<ScoringOutcome, PipelineError> {
        if images.is_empty() {
            tracing::info!("No images staged; returning unobserved condition");
            return Ok(ScoringOutcome {
                condition: VehicleCondition::unobserved(),
                images_processed: 0,
                images_skipped: 0,
            });
        }

        self.detector.ensure_ready().await.map_err(|e| {
            tracing::error!(error = %e, "Detector failed health check");
            PipelineError::DetectorUnavailable(e.to_string())
        })?;

        let (observations, processed, failures) = self.collect(images).await;

        if processed == 0 {
            let last = failures
                .last()
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::error!(images = images.len(), error = %last, "Detector failed every image");
            return Err(PipelineError::DetectorUnavailable(format!(
                "all {} images failed; last error: {last}",
                images.len()
            )));
        }

        let condition = score_observations(&observations, &self.params);
        tracing::info!(
            condition_score = condition.condition_score,
            parts = condition.parts.len(),
            observations = observations.len(),
            images_processed = processed,
            images_skipped = failures.len(),
            "Scoring pass complete"
        );

        Ok(ScoringOutcome {
            condition,
            images_processed: processed,
            images_skipped: failures.len(),
        })
    }

    /// Detect on every image, keeping results in image order.
    async fn collect(
        &self,
        images: &[StagedImage],
    ) -> (Vec<DefectObservation>, usize, Vec<ImageFailure>) {
        // Boxed so the pass stays `Send` behind axum handlers.
        let results: Vec<Result<Vec<DefectObservation>, ImageFailure>> =
            stream::iter(images.iter().map(|image| self.detect_one(image)))
                .boxed()
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut observations = Vec::new();
        let mut processed = 0;
        let mut failures = Vec::new();
        for (image, result) in images.iter().zip(results) {
            match result {
                Ok(found) => {
                    processed += 1;
                    observations.extend(found);
                }
                Err(e) => {
                    tracing::warn!(path = %image.path.display(), error = %e, "Skipping image");
                    failures.push(e);
                }
            }
        }
        (observations, processed, failures)
    }

    async fn detect_one(&self, image: &StagedImage) -> Result<Vec<DefectObservation>, ImageFailure> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| ImageFailure::Read {
                path: image.path.display().to_string(),
                source,
            })?;

        let payload = ImagePayload {
            file_name: image
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string()),
            content_type: image.content_type.clone(),
            bytes,
        };

        Ok(self.detector.detect(&payload).await?)
    }
}
