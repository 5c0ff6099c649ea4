//! Result assembler: the externally consumed shape of a scored analysis.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::defects::{DefectType, SeverityLevel};
use crate::parts::CarPart;
use crate::scoring::{DefectDetail, PartQuality, VehicleCondition};
use crate::types::Timestamp;

/// One detail line in the published result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailResult {
    pub defect_type: DefectType,
    /// Integer severity 0-4.
    pub severity: SeverityLevel,
    pub description: String,
    pub damage_score: f64,
    pub confidence: f64,
}

/// Published view of one assessed part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartResult {
    pub quality: f64,
    pub defects: Vec<DefectType>,
    pub detail: Vec<DetailResult>,
    pub total_damage: f64,
}

/// Published analysis result.
///
/// `parts` is keyed by part label and only contains assessed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub condition_score: f64,
    pub total_damage_score: f64,
    pub parts: IndexMap<CarPart, PartResult>,
    pub created_at: Timestamp,
}

/// Package a vehicle condition for presentation. No computation happens
/// here; every assessed part is carried over in order.
pub fn assemble(condition: &VehicleCondition, created_at: Timestamp) -> AnalysisResult {
    AnalysisResult {
        condition_score: condition.condition_score,
        total_damage_score: condition.total_damage_score,
        parts: condition
            .parts
            .iter()
            .map(|(part, quality)| (*part, part_result(quality)))
            .collect(),
        created_at,
    }
}

fn part_result(quality: &PartQuality) -> PartResult {
    PartResult {
        quality: quality.quality,
        defects: quality.defects.clone(),
        detail: quality.detail_records.iter().map(detail_result).collect(),
        total_damage: quality.total_damage,
    }
}

fn detail_result(detail: &DefectDetail) -> DetailResult {
    DetailResult {
        defect_type: detail.defect_type,
        severity: detail.severity,
        description: detail.description.clone(),
        damage_score: detail.damage_score,
        confidence: detail.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::DefectObservation;
    use crate::parts::PartKind;
    use crate::scoring::{score_observations, ScoringParams};

    #[test]
    fn empty_condition_assembles_to_empty_parts() {
        let now = chrono::Utc::now();
        let result = assemble(&VehicleCondition::unobserved(), now);
        assert_eq!(result.condition_score, 4.0);
        assert_eq!(result.total_damage_score, 0.0);
        assert!(result.parts.is_empty());
        assert_eq!(result.created_at, now);
    }

    #[test]
    fn every_assessed_part_is_published() {
        let hood = CarPart::new(PartKind::Hood);
        let grille = CarPart::new(PartKind::Grille);
        let condition = score_observations(
            &[
                DefectObservation::new(grille, DefectType::Cracked, 3.0, 0.6),
                DefectObservation::new(hood, DefectType::Dent, 2.0, 0.9),
            ],
            &ScoringParams::default(),
        );
        let result = assemble(&condition, chrono::Utc::now());

        let keys: Vec<CarPart> = result.parts.keys().copied().collect();
        assert_eq!(keys, vec![grille, hood]);
        assert_eq!(result.parts[&hood].quality, condition.parts[&hood].quality);
        assert_eq!(result.parts[&grille].detail.len(), 1);
        assert_eq!(result.parts[&grille].detail[0].severity, SeverityLevel::High);
    }

    #[test]
    fn serializes_to_external_shape() {
        let door = CarPart::new(PartKind::FrontDoor);
        let condition = score_observations(
            &[DefectObservation::new(door, DefectType::Dent, 4.5, 0.89)],
            &ScoringParams::default(),
        );
        let json = serde_json::to_value(assemble(&condition, chrono::Utc::now())).unwrap();

        assert_eq!(json["condition_score"], 3.48);
        let part = &json["parts"]["Front-door"];
        assert_eq!(part["quality"], 4.3);
        assert_eq!(part["defects"][0], "Dent");
        assert_eq!(part["detail"][0]["severity"], 4);
        assert_eq!(part["detail"][0]["defect_type"], "Dent");
        assert!(part["total_damage"].is_number());
        assert!(json["created_at"].is_string());
    }
}
