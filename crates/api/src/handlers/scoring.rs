//! Stateless scoring of caller-supplied observations.

use autocheck_core::defects::DefectType;
use autocheck_core::matching::{match_damage_to_parts, Detection};
use autocheck_core::observation::DefectObservation;
use autocheck_core::parts::CarPart;
use autocheck_core::result::{assemble, AnalysisResult};
use autocheck_core::scoring::{score_observations, ScoringParams};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Unmatched detector boxes. Each damage is attributed to its
/// best-overlapping part before scoring.
#[derive(Debug, Default, Deserialize)]
pub struct RawDetections {
    #[serde(default)]
    pub damages: Vec<Detection<DefectType>>,
    #[serde(default)]
    pub parts: Vec<Detection<CarPart>>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub observations: Vec<DefectObservation>,
    /// Scored after `observations`, at full severity.
    #[serde(default)]
    pub detections: Option<RawDetections>,
    /// Overrides the server's calibration constant for this preview only.
    #[serde(default)]
    pub max_damage_score: Option<f64>,
    /// Reject out-of-range severity/confidence instead of clamping.
    #[serde(default)]
    pub strict: bool,
}

/// POST /api/v1/scoring/preview
///
/// Score the given observations, plus any raw detection boxes matched to
/// parts, without touching any analysis.
pub async fn preview(
    State(state): State<AppState>,
    Json(body): Json<PreviewRequest>,
) -> AppResult<Json<DataResponse<AnalysisResult>>> {
    let params = match body.max_damage_score {
        Some(max) => ScoringParams::new(max)?,
        None => *state.pipeline.params(),
    };

    if body.strict {
        for observation in &body.observations {
            observation.validate()?;
        }
    }

    let mut observations = body.observations;
    if let Some(raw) = body.detections {
        observations.extend(
            match_damage_to_parts(&raw.damages, &raw.parts)
                .into_iter()
                .map(|m| m.into_default_observation()),
        );
    }

    let condition = score_observations(&observations, &params);
    Ok(Json(DataResponse {
        data: assemble(&condition, chrono::Utc::now()),
    }))
}
