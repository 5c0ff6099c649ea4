//! Analysis lifecycle and photo positions.
//!
//! ```text
//! Created --upload--> ImagesUploaded --score--> Scored (terminal)
//!    \________________________score_______________/
//! ```
//!
//! Scoring straight from `Created` is allowed and yields the vacuous
//! pristine result. Nothing leaves `Scored`: re-scoring is not modelled.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, StatusId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Analysis status. Discriminants match the `analysis_statuses` seed rows.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Created = 1,
    ImagesUploaded = 2,
    Scored = 3,
}

impl AnalysisStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Created),
            2 => Ok(Self::ImagesUploaded),
            3 => Ok(Self::Scored),
            other => Err(CoreError::Internal(format!("Unknown analysis status id {other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ImagesUploaded => "images_uploaded",
            Self::Scored => "scored",
        }
    }

    /// Uploads are accepted until the analysis is scored.
    pub fn ensure_can_upload(self, analysis_id: DbId) -> Result<(), CoreError> {
        match self {
            Self::Created | Self::ImagesUploaded => Ok(()),
            Self::Scored => Err(CoreError::Conflict(format!(
                "Analysis {analysis_id} is already scored; images can no longer be added"
            ))),
        }
    }

    /// Scoring runs at most once per analysis.
    pub fn ensure_can_score(self, analysis_id: DbId) -> Result<(), CoreError> {
        match self {
            Self::Created | Self::ImagesUploaded => Ok(()),
            Self::Scored => Err(CoreError::Conflict(format!(
                "Analysis {analysis_id} is already scored"
            ))),
        }
    }

    /// A result exists only once scored.
    pub fn ensure_scored(self, analysis_id: DbId) -> Result<(), CoreError> {
        match self {
            Self::Scored => Ok(()),
            _ => Err(CoreError::Conflict(format!(
                "Analysis {analysis_id} has not been scored yet"
            ))),
        }
    }
}

impl From<AnalysisStatus> for StatusId {
    fn from(value: AnalysisStatus) -> Self {
        value as StatusId
    }
}

// ---------------------------------------------------------------------------
// Photo position
// ---------------------------------------------------------------------------

/// Which side of the car a photo was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoPosition {
    Front,
    Rear,
    Left,
    Right,
    Other,
}

impl PhotoPosition {
    pub const ALL: [PhotoPosition; 5] = [
        Self::Front,
        Self::Rear,
        Self::Left,
        Self::Right,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
            Self::Left => "left",
            Self::Right => "right",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid photo position '{value}'. Must be one of: front, rear, left, right, other"
                ))
            })
    }
}
