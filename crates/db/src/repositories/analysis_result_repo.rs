//! Repository for scored results (`analysis_parts`, `part_defects` and the
//! score columns on `analyses`).

use autocheck_core::analysis::AnalysisStatus;
use autocheck_core::defects::{DefectType, SeverityLevel};
use autocheck_core::parts::CarPart;
use autocheck_core::scoring::{DefectDetail, PartQuality, VehicleCondition};
use autocheck_core::types::DbId;
use indexmap::IndexMap;
use sqlx::PgPool;

use crate::models::analysis::Analysis;
use crate::models::analysis_result::{AnalysisPartRow, ImageCounts, PartDefectRow, SaveOutcome};
use crate::repositories::analysis_repo::{AnalysisRepo, COLUMNS as ANALYSIS_COLUMNS};

const PART_COLUMNS: &str = "id, analysis_id, ordinal, part, quality, total_damage, created_at";

const DEFECT_COLUMNS: &str = "d.id, d.analysis_part_id, d.ordinal, d.defect_type, d.severity, \
    d.description, d.damage_score, d.confidence, d.created_at";

/// Provides persistence for scored results.
pub struct AnalysisResultRepo;

impl AnalysisResultRepo {
    /// Store a scored result and move the analysis to `scored`, atomically.
    ///
    /// The analysis row is locked for the whole write, which serializes the
    /// save against uploads. Nothing is written unless the analysis exists,
    /// is not yet scored, and its newest image is still
    /// `counts.last_image_id`.
    pub async fn save(
        pool: &PgPool,
        analysis_id: DbId,
        condition: &VehicleCondition,
        counts: ImageCounts,
    ) -> Result<SaveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(current) = AnalysisRepo::find_for_update(&mut tx, analysis_id).await? else {
            tx.rollback().await?;
            return Ok(SaveOutcome::Missing);
        };
        if current.status_id == AnalysisStatus::Scored.id() {
            tx.rollback().await?;
            return Ok(SaveOutcome::AlreadyScored);
        }

        let latest: (Option<DbId>,) =
            sqlx::query_as("SELECT MAX(id) FROM analysis_images WHERE analysis_id = $1")
                .bind(analysis_id)
                .fetch_one(&mut *tx)
                .await?;
        if latest.0 != counts.last_image_id {
            tx.rollback().await?;
            tracing::warn!(
                analysis_id,
                scored_through = ?counts.last_image_id,
                latest = ?latest.0,
                "Images added during scoring; result discarded"
            );
            return Ok(SaveOutcome::ImagesChanged);
        }

        let query = format!(
            "UPDATE analyses SET
                status_id = $2,
                condition_score = $3,
                total_damage_score = $4,
                images_processed = $5,
                images_skipped = $6,
                scored_at = NOW(),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ANALYSIS_COLUMNS}"
        );
        let analysis = sqlx::query_as::<_, Analysis>(&query)
            .bind(analysis_id)
            .bind(AnalysisStatus::Scored.id())
            .bind(condition.condition_score)
            .bind(condition.total_damage_score)
            .bind(counts.processed)
            .bind(counts.skipped)
            .fetch_one(&mut *tx)
            .await?;

        for (ordinal, quality) in (1i32..).zip(condition.parts.values()) {
            let part_id: (DbId,) = sqlx::query_as(
                "INSERT INTO analysis_parts (analysis_id, ordinal, part, quality, total_damage)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id",
            )
            .bind(analysis_id)
            .bind(ordinal)
            .bind(quality.part.label())
            .bind(quality.quality)
            .bind(quality.total_damage)
            .fetch_one(&mut *tx)
            .await?;

            for (defect_ordinal, detail) in (1i32..).zip(&quality.detail_records) {
                sqlx::query(
                    "INSERT INTO part_defects
                        (analysis_part_id, ordinal, defect_type, severity, description, damage_score, confidence)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(part_id.0)
                .bind(defect_ordinal)
                .bind(detail.defect_type.label())
                .bind(i16::from(detail.severity.value()))
                .bind(&detail.description)
                .bind(detail.damage_score)
                .bind(detail.confidence)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            analysis_id,
            parts = condition.parts.len(),
            condition_score = condition.condition_score,
            "Analysis result stored"
        );
        Ok(SaveOutcome::Saved(analysis))
    }

    /// Rebuild the stored condition of a scored analysis.
    ///
    /// Returns `None` when the analysis has not been scored.
    pub async fn load(
        pool: &PgPool,
        analysis: &Analysis,
    ) -> Result<Option<VehicleCondition>, sqlx::Error> {
        let (Some(condition_score), Some(total_damage_score)) =
            (analysis.condition_score, analysis.total_damage_score)
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {PART_COLUMNS} FROM analysis_parts
             WHERE analysis_id = $1
             ORDER BY ordinal"
        );
        let part_rows = sqlx::query_as::<_, AnalysisPartRow>(&query)
            .bind(analysis.id)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT {DEFECT_COLUMNS} FROM part_defects d
             JOIN analysis_parts p ON p.id = d.analysis_part_id
             WHERE p.analysis_id = $1
             ORDER BY p.ordinal, d.ordinal"
        );
        let defect_rows = sqlx::query_as::<_, PartDefectRow>(&query)
            .bind(analysis.id)
            .fetch_all(pool)
            .await?;

        let mut parts: IndexMap<CarPart, PartQuality> = IndexMap::with_capacity(part_rows.len());
        let mut part_keys: IndexMap<DbId, CarPart> = IndexMap::with_capacity(part_rows.len());
        for row in part_rows {
            let part = CarPart::from_label(&row.part);
            part_keys.insert(row.id, part);
            parts.insert(
                part,
                PartQuality {
                    part,
                    quality: row.quality,
                    total_damage: row.total_damage,
                    defects: Vec::new(),
                    detail_records: Vec::new(),
                },
            );
        }

        for row in defect_rows {
            let Some(quality) = part_keys
                .get(&row.analysis_part_id)
                .and_then(|part| parts.get_mut(part))
            else {
                continue;
            };
            let detail = detail_from_row(row)?;
            quality.defects.push(detail.defect_type);
            quality.detail_records.push(detail);
        }

        Ok(Some(VehicleCondition {
            condition_score,
            total_damage_score,
            parts,
        }))
    }
}

fn detail_from_row(row: PartDefectRow) -> Result<DefectDetail, sqlx::Error> {
    let severity = u8::try_from(row.severity)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
        .and_then(|v| SeverityLevel::try_from(v).map_err(|e| sqlx::Error::Decode(Box::new(e))))?;
    Ok(DefectDetail {
        defect_type: DefectType::from_label(&row.defect_type),
        severity,
        description: row.description,
        damage_score: row.damage_score,
        confidence: row.confidence,
    })
}
