//! Defect vocabulary and integer severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defect type
// ---------------------------------------------------------------------------

/// Kind of damage reported by the detector.
///
/// Serializes as its label (`"Broken part"`, `"Paint chip"`, ...). Unknown
/// labels deserialize to [`DefectType::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DefectType {
    Dent,
    Cracked,
    Scratch,
    Flaking,
    BrokenPart,
    PaintChip,
    MissingPart,
    Corrosion,
    Unrecognized,
}

impl DefectType {
    /// Every recognized defect type.
    pub const ALL: [DefectType; 8] = [
        Self::Dent,
        Self::Cracked,
        Self::Scratch,
        Self::Flaking,
        Self::BrokenPart,
        Self::PaintChip,
        Self::MissingPart,
        Self::Corrosion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dent => "Dent",
            Self::Cracked => "Cracked",
            Self::Scratch => "Scratch",
            Self::Flaking => "Flaking",
            Self::BrokenPart => "Broken part",
            Self::PaintChip => "Paint chip",
            Self::MissingPart => "Missing part",
            Self::Corrosion => "Corrosion",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// Strict parse. Case-insensitive; `-` and `_` are accepted in place of
    /// spaces, and `crack` is accepted for `Cracked`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().replace(['-', '_'], " ").to_ascii_lowercase();
        if normalized == "crack" {
            return Some(Self::Cracked);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(&normalized))
    }

    /// Lenient parse used at the detector boundary.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case(Self::Unrecognized.label()) {
            return Self::Unrecognized;
        }
        Self::parse(label).unwrap_or_else(|| {
            tracing::warn!(label, "Unrecognized defect type label");
            Self::Unrecognized
        })
    }
}

impl fmt::Display for DefectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DefectType {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<DefectType> for String {
    fn from(value: DefectType) -> Self {
        value.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Severity level
// ---------------------------------------------------------------------------

/// Integer severity recorded on detail records (0-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SeverityLevel {
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl SeverityLevel {
    /// Derive the level from a raw detector severity:
    /// `round(clamp(severity, 0, 4))`, ties to even. NaN maps to `None`.
    pub fn from_raw(severity: f64) -> Self {
        if severity.is_nan() {
            return Self::None;
        }
        match severity.clamp(0.0, 4.0).round_ties_even() as u8 {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No",
            Self::Low => "Minor",
            Self::Medium => "Moderate",
            Self::High => "Serious",
            Self::Critical => "Critical",
        }
    }
}

impl From<SeverityLevel> for u8 {
    fn from(value: SeverityLevel) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for SeverityLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Severity level must be between 0 and 4, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
