//! Scored result rows.
//!
//! Maps to `analysis_parts` and `part_defects`. Together with the score
//! columns on `analyses` they hold everything needed to rebuild a
//! [`VehicleCondition`](autocheck_core::scoring::VehicleCondition).

use autocheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::analysis::Analysis;

/// A row from the `analysis_parts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisPartRow {
    pub id: DbId,
    pub analysis_id: DbId,
    pub ordinal: i32,
    pub part: String,
    pub quality: f64,
    pub total_damage: f64,
    pub created_at: Timestamp,
}

/// A row from the `part_defects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartDefectRow {
    pub id: DbId,
    pub analysis_part_id: DbId,
    pub ordinal: i32,
    pub defect_type: String,
    pub severity: i16,
    pub description: String,
    pub damage_score: f64,
    pub confidence: f64,
    pub created_at: Timestamp,
}

/// Summary counters stored alongside a result, plus the image set they
/// were taken over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageCounts {
    pub processed: i32,
    pub skipped: i32,
    /// Highest `analysis_images.id` in the scored set; `None` when the
    /// pass saw no images.
    pub last_image_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Save outcome
// ---------------------------------------------------------------------------

/// What happened to a result write. Only `Saved` touched the database.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Stored; the analysis is now `scored`.
    Saved(Analysis),
    /// No analysis with that id.
    Missing,
    /// Another pass stored its result first.
    AlreadyScored,
    /// Images were added after the scored set was listed.
    ImagesChanged,
}

impl SaveOutcome {
    pub fn saved(self) -> Option<Analysis> {
        match self {
            Self::Saved(analysis) => Some(analysis),
            _ => None,
        }
    }
}
