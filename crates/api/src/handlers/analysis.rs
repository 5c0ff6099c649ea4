//! Handlers for the analysis lifecycle: create, upload, score, read back.

use std::path::PathBuf;

use autocheck_core::analysis::{AnalysisStatus, PhotoPosition};
use autocheck_core::error::CoreError;
use autocheck_core::registry::RegistrySummary;
use autocheck_core::result::{assemble, AnalysisResult};
use autocheck_core::types::{DbId, Timestamp};
use autocheck_core::upload::{validate_image_upload, ValidatedImage};
use autocheck_core::vin::normalize_optional_vin;
use autocheck_db::models::analysis::{Analysis, CreateAnalysis};
use autocheck_db::models::analysis_image::{AnalysisImage, CreateAnalysisImage};
use autocheck_db::models::analysis_result::{ImageCounts, SaveOutcome};
use autocheck_db::repositories::{AnalysisImageRepo, AnalysisRepo, AnalysisResultRepo};
use autocheck_pipeline::StagedImage;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateAnalysisRequest {
    pub vin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub position: String,
}

/// Public view of an analysis row.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub id: DbId,
    pub vin: Option<String>,
    pub status: AnalysisStatus,
    pub registry: Option<RegistrySummary>,
    pub condition_score: Option<f64>,
    pub total_damage_score: Option<f64>,
    pub scored_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<&Analysis> for AnalysisResponse {
    type Error = CoreError;

    fn try_from(row: &Analysis) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            vin: row.vin.clone(),
            status: row.status()?,
            registry: row.registry().map(|r| r.summary()),
            condition_score: row.condition_score,
            total_damage_score: row.total_damage_score,
            scored_at: row.scored_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A scored result plus how many images fed it.
///
/// `created_at` (inside `result`) is the analysis creation time.
#[derive(Debug, Serialize)]
pub struct ScoredAnalysisResponse {
    pub analysis_id: DbId,
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub scored_at: Option<Timestamp>,
    pub images_processed: i32,
    pub images_skipped: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_analysis(state: &AppState, id: DbId) -> AppResult<Analysis> {
    AnalysisRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Analysis",
            id,
        }))
}

/// One uploaded file that passed validation.
struct IncomingImage {
    original_filename: String,
    data: Vec<u8>,
    checked: ValidatedImage,
}

/// Drain every file field of a multipart body, validating each.
async fn read_images(mut multipart: Multipart) -> AppResult<Vec<IncomingImage>> {
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue; // non-file fields are ignored
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let checked = validate_image_upload(&filename, &data)?;
        images.push(IncomingImage {
            original_filename: filename,
            data: data.to_vec(),
            checked,
        });
    }

    if images.is_empty() {
        return Err(AppError::BadRequest(
            "Request contains no image files".into(),
        ));
    }
    Ok(images)
}

fn scored_response(analysis: &Analysis, result: AnalysisResult) -> ScoredAnalysisResponse {
    ScoredAnalysisResponse {
        analysis_id: analysis.id,
        result,
        scored_at: analysis.scored_at,
        images_processed: analysis.images_processed.unwrap_or(0),
        images_skipped: analysis.images_skipped.unwrap_or(0),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/analyses
///
/// Create an analysis. When a VIN is given and a registry is configured,
/// the registry report is fetched and stored with the analysis.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateAnalysisRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AnalysisResponse>>)> {
    let vin = normalize_optional_vin(body.vin.as_deref())?;

    let registry_report = match (&vin, &state.registry) {
        (Some(vin), Some(registry)) => {
            let report = registry.fetch_report(vin).await;
            Some(
                serde_json::to_value(&report)
                    .map_err(|e| AppError::InternalError(e.to_string()))?,
            )
        }
        _ => None,
    };

    let analysis = AnalysisRepo::create(
        &state.pool,
        &CreateAnalysis {
            vin,
            registry_report,
        },
    )
    .await?;

    tracing::info!(analysis_id = analysis.id, vin = ?analysis.vin, "Analysis created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AnalysisResponse::try_from(&analysis)?,
        }),
    ))
}

/// GET /api/v1/analyses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AnalysisResponse>>> {
    let analysis = find_analysis(&state, id).await?;
    Ok(Json(DataResponse {
        data: AnalysisResponse::try_from(&analysis)?,
    }))
}

/// POST /api/v1/analyses/{id}/images?position=front
///
/// Store one or more images for a photo position. Sequence numbers continue
/// per position. Rejected once the analysis is scored.
pub async fn upload_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<AnalysisImage>>>)> {
    let position = PhotoPosition::parse(&query.position)?;
    let images = read_images(multipart).await?;

    let mut tx = state.pool.begin().await?;

    let analysis = AnalysisRepo::find_for_update(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Analysis",
            id,
        }))?;
    analysis.status()?.ensure_can_upload(id)?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(images.len());
    let stored = async {
        let mut stored = Vec::with_capacity(images.len());
        for image in &images {
            let sequence =
                AnalysisImageRepo::next_sequence(&mut tx, id, position.as_str()).await?;
            let path = state
                .storage
                .image_path(id, position, sequence, &image.checked.extension);

            state
                .storage
                .write(&path, &image.data)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to store image: {e}")))?;
            written.push(path.clone());

            let row = AnalysisImageRepo::create(
                &mut tx,
                &CreateAnalysisImage {
                    analysis_id: id,
                    position: position.as_str().to_string(),
                    sequence,
                    file_path: path.to_string_lossy().into_owned(),
                    original_filename: Some(image.original_filename.clone()),
                    content_type: image.checked.content_type.to_string(),
                    size_bytes: image.data.len() as i64,
                },
            )
            .await?;
            stored.push(row);
        }
        AnalysisRepo::mark_images_uploaded(&mut tx, id).await?;
        tx.commit().await?;
        Ok::<_, AppError>(stored)
    }
    .await;

    match stored {
        Ok(stored) => {
            tracing::info!(
                analysis_id = id,
                position = position.as_str(),
                count = stored.len(),
                "Images uploaded"
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
        }
        Err(e) => {
            state.storage.discard(&written).await;
            Err(e)
        }
    }
}

/// GET /api/v1/analyses/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AnalysisImage>>>> {
    find_analysis(&state, id).await?;
    let images = AnalysisImageRepo::list_by_analysis(&state.pool, id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/analyses/{id}/score
///
/// Run the scoring pass over every uploaded image and persist the result.
/// An analysis is scored at most once.
pub async fn score(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScoredAnalysisResponse>>> {
    let analysis = find_analysis(&state, id).await?;
    analysis.status()?.ensure_can_score(id)?;

    let images = AnalysisImageRepo::list_by_analysis(&state.pool, id).await?;
    let last_image_id = images.iter().map(|image| image.id).max();
    let staged: Vec<StagedImage> = images
        .into_iter()
        .map(|image| StagedImage {
            path: PathBuf::from(image.file_path),
            content_type: image.content_type,
        })
        .collect();

    let outcome = state.pipeline.run(&staged).await?;

    let counts = ImageCounts {
        processed: i32::try_from(outcome.images_processed).unwrap_or(i32::MAX),
        skipped: i32::try_from(outcome.images_skipped).unwrap_or(i32::MAX),
        last_image_id,
    };
    let saved = match AnalysisResultRepo::save(&state.pool, id, &outcome.condition, counts).await? {
        SaveOutcome::Saved(analysis) => analysis,
        SaveOutcome::Missing => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Analysis",
                id,
            }))
        }
        SaveOutcome::AlreadyScored => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Analysis {id} was scored by a concurrent request"
            ))))
        }
        SaveOutcome::ImagesChanged => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Images were added to analysis {id} while it was being scored; score it again"
            ))))
        }
    };

    let result = assemble(&outcome.condition, saved.created_at);

    tracing::info!(
        analysis_id = id,
        condition_score = result.condition_score,
        parts = result.parts.len(),
        "Analysis scored"
    );

    Ok(Json(DataResponse {
        data: scored_response(&saved, result),
    }))
}

/// GET /api/v1/analyses/{id}/result
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScoredAnalysisResponse>>> {
    let analysis = find_analysis(&state, id).await?;
    analysis.status()?.ensure_scored(id)?;

    let condition = AnalysisResultRepo::load(&state.pool, &analysis)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "Analysis {id} is scored but has no stored scores"
            )))
        })?;

    let result = assemble(&condition, analysis.created_at);

    Ok(Json(DataResponse {
        data: scored_response(&analysis, result),
    }))
}
