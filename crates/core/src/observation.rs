//! Defect observations and the observation normalizer.
//!
//! An observation carries the raw detector values. They are never rejected
//! on the scoring path: [`damage_score`] clamps severity to `[0, 5]` and
//! confidence to `[0, 1]` before weighting.

use serde::{Deserialize, Serialize};

use crate::defects::DefectType;
use crate::error::CoreError;
use crate::parts::CarPart;
use crate::weights::{defect_weight, part_weight};

/// Upper bound of the raw detector severity scale.
pub const MAX_SEVERITY: f64 = 5.0;

/// Upper bound of detector confidence.
pub const MAX_CONFIDENCE: f64 = 1.0;

/// One detected defect instance on one part in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectObservation {
    #[serde(alias = "car_part")]
    pub part: CarPart,
    pub defect_type: DefectType,
    pub severity: f64,
    pub confidence: f64,
}

impl DefectObservation {
    /// Build an observation from raw detector values. Out-of-range values
    /// are kept as-is and clamped when scored.
    pub fn new(part: CarPart, defect_type: DefectType, severity: f64, confidence: f64) -> Self {
        Self {
            part,
            defect_type,
            severity,
            confidence,
        }
    }

    /// Build an observation that must already satisfy the value contract.
    ///
    /// For callers that construct observations directly instead of taking
    /// them from the detector.
    pub fn try_new(
        part: CarPart,
        defect_type: DefectType,
        severity: f64,
        confidence: f64,
    ) -> Result<Self, CoreError> {
        let observation = Self::new(part, defect_type, severity, confidence);
        observation.validate()?;
        Ok(observation)
    }

    /// Check the raw values against the detector contract.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=MAX_SEVERITY).contains(&self.severity) {
            return Err(CoreError::InvalidObservation(format!(
                "severity must be between 0 and {MAX_SEVERITY}, got {}",
                self.severity
            )));
        }
        if !(0.0..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(CoreError::InvalidObservation(format!(
                "confidence must be between 0 and {MAX_CONFIDENCE}, got {}",
                self.confidence
            )));
        }
        Ok(())
    }

    /// Severity clamped to `[0, 5]` and scaled to `[0, 1]`.
    pub fn severity_fraction(&self) -> f64 {
        clamp_finite(self.severity, 0.0, MAX_SEVERITY) / MAX_SEVERITY
    }

    /// Confidence clamped to `[0, 1]`.
    pub fn clamped_confidence(&self) -> f64 {
        clamp_finite(self.confidence, 0.0, MAX_CONFIDENCE)
    }

    pub fn damage_score(&self) -> f64 {
        damage_score(self)
    }
}

/// Normalize one observation into its weighted damage contribution:
///
/// ```text
/// defect_weight × part_weight × clamp(severity, 0, 5) / 5 × clamp(confidence, 0, 1)
/// ```
///
/// Always finite and non-negative.
pub fn damage_score(observation: &DefectObservation) -> f64 {
    defect_weight(observation.defect_type)
        * part_weight(observation.part)
        * observation.severity_fraction()
        * observation.clamped_confidence()
}

/// Clamp that maps NaN to the lower bound.
fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::PartKind;
    use assert_matches::assert_matches;

    fn dent_on_door(severity: f64, confidence: f64) -> DefectObservation {
        DefectObservation::new(
            CarPart::new(PartKind::FrontDoor),
            DefectType::Dent,
            severity,
            confidence,
        )
    }

    #[test]
    fn reference_observation_score() {
        let score = dent_on_door(4.5, 0.89).damage_score();
        assert!((score - 1.5 * 1.3 * 0.9 * 0.89).abs() < 1e-12);
        assert!((score - 1.561).abs() < 1e-3);
    }

    #[test]
    fn zero_severity_or_confidence_scores_zero() {
        assert_eq!(dent_on_door(0.0, 0.9).damage_score(), 0.0);
        assert_eq!(dent_on_door(3.0, 0.0).damage_score(), 0.0);
    }

    #[test]
    fn out_of_range_severity_is_clamped() {
        assert_eq!(
            dent_on_door(7.0, 0.8).damage_score(),
            dent_on_door(5.0, 0.8).damage_score()
        );
        assert_eq!(dent_on_door(-1.0, 0.8).damage_score(), 0.0);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        assert_eq!(
            dent_on_door(2.0, 1.7).damage_score(),
            dent_on_door(2.0, 1.0).damage_score()
        );
    }

    #[test]
    fn nan_and_infinite_inputs_stay_finite() {
        assert_eq!(dent_on_door(f64::NAN, 0.5).damage_score(), 0.0);
        assert_eq!(
            dent_on_door(f64::INFINITY, 1.0).damage_score(),
            dent_on_door(5.0, 1.0).damage_score()
        );
    }

    #[test]
    fn monotonic_in_severity_and_confidence() {
        let steps: Vec<f64> = (0..=20).map(|i| f64::from(i) * 0.25).collect();
        for pair in steps.windows(2) {
            assert!(dent_on_door(pair[0], 0.7).damage_score() <= dent_on_door(pair[1], 0.7).damage_score());
        }
        let confidences: Vec<f64> = (0..=10).map(|i| f64::from(i) / 10.0).collect();
        for pair in confidences.windows(2) {
            assert!(dent_on_door(3.0, pair[0]).damage_score() <= dent_on_door(3.0, pair[1]).damage_score());
        }
    }

    #[test]
    fn confidence_discounts_multiplicatively() {
        let severe_uncertain = dent_on_door(5.0, 0.5).damage_score();
        let moderate_certain = dent_on_door(2.5, 1.0).damage_score();
        assert!((severe_uncertain - moderate_certain).abs() < 1e-12);
    }

    #[test]
    fn unknown_labels_use_default_weights() {
        let obs = DefectObservation::new(CarPart::UNMAPPED, DefectType::Unrecognized, 5.0, 1.0);
        assert_eq!(obs.damage_score(), 1.0);
    }

    #[test]
    fn try_new_rejects_out_of_contract_values() {
        let part = CarPart::new(PartKind::Hood);
        assert_matches!(
            DefectObservation::try_new(part, DefectType::Dent, 7.0, 0.5),
            Err(CoreError::InvalidObservation(_))
        );
        assert_matches!(
            DefectObservation::try_new(part, DefectType::Dent, 2.0, f64::NAN),
            Err(CoreError::InvalidObservation(_))
        );
        assert!(DefectObservation::try_new(part, DefectType::Dent, 5.0, 1.0).is_ok());
    }

    #[test]
    fn deserializes_detector_field_names() {
        let obs: DefectObservation = serde_json::from_str(
            r#"{"car_part":"Front-door","defect_type":"Dent","severity":4.5,"confidence":0.89}"#,
        )
        .unwrap();
        assert_eq!(obs.part, CarPart::new(PartKind::FrontDoor));
        assert_eq!(obs.defect_type, DefectType::Dent);
    }
}
