//! Part aggregator and vehicle scorer.
//!
//! Converts a batch of [`DefectObservation`]s into per-part quality scores
//! (0-5) and a vehicle condition score (0-4). The whole computation is a
//! pure function of the observation sequence: running it twice on the same
//! input yields identical results.
//!
//! Parts without observations never appear in the output. Absence means
//! "not assessed", not "undamaged".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::defects::{DefectType, SeverityLevel};
use crate::error::CoreError;
use crate::observation::DefectObservation;
use crate::parts::CarPart;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Damage total treated as "total loss" for normalization.
pub const MAX_DAMAGE_SCORE: f64 = 12.0;

/// Quality of a pristine part.
pub const MAX_PART_QUALITY: f64 = 5.0;

/// Condition score of a pristine vehicle.
pub const MAX_CONDITION_SCORE: f64 = 4.0;

/// Decimal places kept on part quality.
pub const QUALITY_DECIMALS: i32 = 1;

/// Decimal places kept on the condition score.
pub const CONDITION_DECIMALS: i32 = 2;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Calibration for a scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub max_damage_score: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            max_damage_score: MAX_DAMAGE_SCORE,
        }
    }
}

impl ScoringParams {
    /// Build parameters with a custom calibration constant.
    ///
    /// The constant must be finite and strictly positive so the scorer can
    /// never divide by zero.
    pub fn new(max_damage_score: f64) -> Result<Self, CoreError> {
        if !max_damage_score.is_finite() || max_damage_score <= 0.0 {
            return Err(CoreError::Validation(format!(
                "max_damage_score must be a positive number, got {max_damage_score}"
            )));
        }
        Ok(Self { max_damage_score })
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One observation as recorded against its part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectDetail {
    pub defect_type: DefectType,
    pub severity: SeverityLevel,
    pub description: String,
    pub damage_score: f64,
    pub confidence: f64,
}

/// Aggregated condition of one part that has at least one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartQuality {
    pub part: CarPart,
    /// 0.0 (maximal damage) to 5.0 (pristine), one decimal.
    pub quality: f64,
    /// Sum of the part's damage scores before normalization.
    pub total_damage: f64,
    /// Defect labels in encounter order, duplicates kept.
    pub defects: Vec<DefectType>,
    pub detail_records: Vec<DefectDetail>,
}

/// Condition of the whole vehicle for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCondition {
    /// 0.0 to 4.0 (pristine), two decimals.
    pub condition_score: f64,
    /// Sum of every observation's damage score across all parts.
    pub total_damage_score: f64,
    /// Parts in first-seen order.
    pub parts: IndexMap<CarPart, PartQuality>,
}

impl VehicleCondition {
    /// The vacuous result for an analysis with nothing observed.
    ///
    /// Pristine by construction only: it does not confirm the vehicle is
    /// undamaged.
    pub fn unobserved() -> Self {
        Self {
            condition_score: MAX_CONDITION_SCORE,
            total_damage_score: 0.0,
            parts: IndexMap::new(),
        }
    }

    pub fn is_unobserved(&self) -> bool {
        self.parts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a full batch of observations.
pub fn score_observations(
    observations: &[DefectObservation],
    params: &ScoringParams,
) -> VehicleCondition {
    let scored: Vec<(&DefectObservation, f64)> = observations
        .iter()
        .map(|obs| (obs, obs.damage_score()))
        .collect();

    let total_damage_score: f64 = scored.iter().map(|(_, d)| d).sum();
    let parts = aggregate_parts(&scored, params);

    VehicleCondition {
        condition_score: condition_score(total_damage_score, params),
        total_damage_score,
        parts,
    }
}

/// Group scored observations by part and derive each part's quality.
///
/// Part order follows first appearance; detail records keep encounter
/// order within a part. Each part's damage is normalized against
/// `max_damage_score / number_of_damaged_parts`. Returns an empty map
/// (and divides by nothing) when there are no observations.
pub fn aggregate_parts(
    scored: &[(&DefectObservation, f64)],
    params: &ScoringParams,
) -> IndexMap<CarPart, PartQuality> {
    let groups = scored.iter().fold(
        IndexMap::<CarPart, Vec<(&DefectObservation, f64)>>::new(),
        |mut groups, &(obs, damage)| {
            groups.entry(obs.part).or_default().push((obs, damage));
            groups
        },
    );

    if groups.is_empty() {
        return IndexMap::new();
    }

    let per_part_cap = params.max_damage_score / groups.len() as f64;

    groups
        .into_iter()
        .map(|(part, members)| {
            let total_damage: f64 = members.iter().map(|(_, d)| d).sum();
            let quality = PartQuality {
                part,
                quality: part_quality(total_damage, per_part_cap),
                total_damage,
                defects: members.iter().map(|(obs, _)| obs.defect_type).collect(),
                detail_records: members
                    .iter()
                    .map(|&(obs, damage)| detail_record(obs, damage))
                    .collect(),
            };
            (part, quality)
        })
        .collect()
}

/// Quality of one part: `round(clamp(5 - 5 × min(1, damage / cap), 0, 5), 1)`.
pub fn part_quality(total_damage: f64, per_part_cap: f64) -> f64 {
    let normalized = (total_damage / per_part_cap).min(1.0);
    round_to(
        (MAX_PART_QUALITY - MAX_PART_QUALITY * normalized).clamp(0.0, MAX_PART_QUALITY),
        QUALITY_DECIMALS,
    )
}

/// Vehicle condition: `round(clamp(4 - 4 × damage / max, 0, 4), 2)`.
///
/// Non-increasing in `total_damage_score`; exactly 4.0 at zero damage and
/// exactly 0.0 from `max_damage_score` upwards.
pub fn condition_score(total_damage_score: f64, params: &ScoringParams) -> f64 {
    let ratio = total_damage_score / params.max_damage_score;
    round_to(
        (MAX_CONDITION_SCORE - MAX_CONDITION_SCORE * ratio).clamp(0.0, MAX_CONDITION_SCORE),
        CONDITION_DECIMALS,
    )
}

fn detail_record(obs: &DefectObservation, damage_score: f64) -> DefectDetail {
    let severity = SeverityLevel::from_raw(obs.severity);
    let confidence = obs.clamped_confidence();
    DefectDetail {
        defect_type: obs.defect_type,
        severity,
        description: describe(obs.part, obs.defect_type, severity, confidence),
        damage_score,
        confidence,
    }
}

/// Human-readable line for a detail record, e.g.
/// `"Critical dent on Front-door (confidence 89%)"`.
pub fn describe(
    part: CarPart,
    defect_type: DefectType,
    severity: SeverityLevel,
    confidence: f64,
) -> String {
    format!(
        "{} {} on {} (confidence {:.0}%)",
        severity.label(),
        defect_type.label().to_lowercase(),
        part,
        confidence * 100.0
    )
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
