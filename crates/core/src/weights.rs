//! Static weight tables for damage scoring.
//!
//! Pure data. The scorer only ever reads these through [`defect_weight`]
//! and [`part_weight`], which fall back to [`DEFAULT_WEIGHT`] for anything
//! not listed (including the `Unrecognized` / `Unmapped` buckets).

use crate::defects::DefectType;
use crate::parts::{CarPart, PartKind};

/// Weight applied to defect types and parts missing from the tables.
pub const DEFAULT_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// Defect weights
// ---------------------------------------------------------------------------

/// Severity weight per defect type.
pub const DEFECT_WEIGHTS: &[(DefectType, f64)] = &[
    (DefectType::Dent, 1.5),
    (DefectType::Cracked, 1.8),
    (DefectType::Scratch, 0.5),
    (DefectType::Flaking, 0.6),
    (DefectType::BrokenPart, 2.0),
    (DefectType::PaintChip, 0.6),
    (DefectType::MissingPart, 2.5),
    (DefectType::Corrosion, 1.2),
];

// ---------------------------------------------------------------------------
// Part weights
// ---------------------------------------------------------------------------

/// Importance weight per part kind. Sides share their kind's weight.
pub const PART_WEIGHTS: &[(PartKind, f64)] = &[
    (PartKind::Windshield, 1.5),
    (PartKind::BackWindshield, 1.2),
    (PartKind::FrontWindow, 0.9),
    (PartKind::BackWindow, 0.8),
    (PartKind::FrontDoor, 1.3),
    (PartKind::BackDoor, 1.2),
    (PartKind::FrontWheel, 1.0),
    (PartKind::BackWheel, 1.0),
    (PartKind::FrontBumper, 1.0),
    (PartKind::BackBumper, 1.0),
    (PartKind::Headlight, 1.1),
    (PartKind::TailLight, 1.0),
    (PartKind::Hood, 1.2),
    (PartKind::Trunk, 1.0),
    (PartKind::LicensePlate, 0.3),
    (PartKind::Mirror, 0.4),
    (PartKind::Roof, 1.2),
    (PartKind::Grille, 0.7),
    (PartKind::RockerPanel, 0.9),
    (PartKind::QuarterPanel, 1.2),
    (PartKind::Fender, 1.1),
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Severity weight for a defect type, [`DEFAULT_WEIGHT`] if not listed.
pub fn defect_weight(defect_type: DefectType) -> f64 {
    DEFECT_WEIGHTS
        .iter()
        .find(|(t, _)| *t == defect_type)
        .map_or(DEFAULT_WEIGHT, |(_, w)| *w)
}

/// Importance weight for a part, [`DEFAULT_WEIGHT`] if not listed.
pub fn part_weight(part: CarPart) -> f64 {
    PART_WEIGHTS
        .iter()
        .find(|(k, _)| *k == part.kind)
        .map_or(DEFAULT_WEIGHT, |(_, w)| *w)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
