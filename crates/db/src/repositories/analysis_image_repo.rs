//! Repository for the `analysis_images` table.

use autocheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::analysis_image::{AnalysisImage, CreateAnalysisImage};
use crate::repositories::PgTransaction;

const COLUMNS: &str = "id, analysis_id, position, sequence, file_path, original_filename, \
    content_type, size_bytes, created_at";

/// Provides operations for uploaded analysis images.
pub struct AnalysisImageRepo;

impl AnalysisImageRepo {
    /// Next free sequence number for `(analysis_id, position)`, starting at 1.
    ///
    /// Only stable while the analysis row is locked by the same transaction.
    pub async fn next_sequence(
        tx: &mut PgTransaction<'_>,
        analysis_id: DbId,
        position: &str,
    ) -> Result<i32, sqlx::Error> {
        let next: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence), 0) + 1
             FROM analysis_images WHERE analysis_id = $1 AND position = $2",
        )
        .bind(analysis_id)
        .bind(position)
        .fetch_one(&mut **tx)
        .await?;
        Ok(next.0)
    }

    /// Record a stored image.
    pub async fn create(
        tx: &mut PgTransaction<'_>,
        input: &CreateAnalysisImage,
    ) -> Result<AnalysisImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO analysis_images
                (analysis_id, position, sequence, file_path, original_filename, content_type, size_bytes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisImage>(&query)
            .bind(input.analysis_id)
            .bind(&input.position)
            .bind(input.sequence)
            .bind(&input.file_path)
            .bind(&input.original_filename)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .fetch_one(&mut **tx)
            .await
    }

    /// All images of an analysis in upload order.
    pub async fn list_by_analysis(
        pool: &PgPool,
        analysis_id: DbId,
    ) -> Result<Vec<AnalysisImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analysis_images
             WHERE analysis_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, AnalysisImage>(&query)
            .bind(analysis_id)
            .fetch_all(pool)
            .await
    }
}
