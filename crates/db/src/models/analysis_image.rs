//! Uploaded image models and DTOs.
//!
//! Maps to the `analysis_images` table. Files live on disk; the row keeps
//! the path and upload metadata.

use autocheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `analysis_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisImage {
    pub id: DbId,
    pub analysis_id: DbId,
    pub position: String,
    /// 1-based, per `(analysis_id, position)`.
    pub sequence: i32,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for recording a stored image.
#[derive(Debug, Deserialize)]
pub struct CreateAnalysisImage {
    pub analysis_id: DbId,
    pub position: String,
    pub sequence: i32,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub size_bytes: i64,
}
