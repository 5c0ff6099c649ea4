//! Analysis models and DTOs.
//!
//! Maps to the `analyses` table.

use autocheck_core::analysis::AnalysisStatus;
use autocheck_core::error::CoreError;
use autocheck_core::registry::RegistryReport;
use autocheck_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `analyses` table.
///
/// The score columns are populated together when the analysis is scored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Analysis {
    pub id: DbId,
    pub vin: Option<String>,
    pub status_id: StatusId,
    pub registry_report: Option<serde_json::Value>,
    pub condition_score: Option<f64>,
    pub total_damage_score: Option<f64>,
    pub images_processed: Option<i32>,
    pub images_skipped: Option<i32>,
    pub scored_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Analysis {
    pub fn status(&self) -> Result<AnalysisStatus, CoreError> {
        AnalysisStatus::from_id(self.status_id)
    }

    /// Decode the stored registry report, if any.
    ///
    /// A report that no longer matches the current shape is treated as
    /// missing rather than failing the whole read.
    pub fn registry(&self) -> Option<RegistryReport> {
        let value = self.registry_report.as_ref()?;
        match serde_json::from_value(value.clone()) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(analysis_id = self.id, error = %e, "Stored registry report is unreadable");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a new analysis.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAnalysis {
    /// Already normalized.
    pub vin: Option<String>,
    pub registry_report: Option<serde_json::Value>,
}
