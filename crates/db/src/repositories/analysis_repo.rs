//! Repository for the `analyses` table.

use autocheck_core::analysis::AnalysisStatus;
use autocheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::analysis::{Analysis, CreateAnalysis};
use crate::repositories::PgTransaction;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, vin, status_id, registry_report, condition_score, \
    total_damage_score, images_processed, images_skipped, scored_at, created_at, updated_at";

/// Provides CRUD operations for analyses.
pub struct AnalysisRepo;

impl AnalysisRepo {
    /// Insert a new analysis in the `created` status.
    pub async fn create(pool: &PgPool, input: &CreateAnalysis) -> Result<Analysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO analyses (vin, status_id, registry_report)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Analysis>(&query)
            .bind(&input.vin)
            .bind(AnalysisStatus::Created.id())
            .bind(&input.registry_report)
            .fetch_one(pool)
            .await
    }

    /// Find an analysis by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Analysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analyses WHERE id = $1");
        sqlx::query_as::<_, Analysis>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load an analysis and hold a row lock on it until the transaction
    /// ends. Serializes uploads and scoring for the same analysis.
    pub async fn find_for_update(
        tx: &mut PgTransaction<'_>,
        id: DbId,
    ) -> Result<Option<Analysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analyses WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Analysis>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a `created` analysis to `images_uploaded`. No-op otherwise.
    pub async fn mark_images_uploaded(
        tx: &mut PgTransaction<'_>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE analyses SET status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(AnalysisStatus::ImagesUploaded.id())
        .bind(AnalysisStatus::Created.id())
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
