//! Damage-to-part matching by bounding-box overlap.
//!
//! For callers that receive raw detections (boxes) instead of matched
//! `(part, defect)` tuples. Each damage box goes to the part box with the
//! greatest IoU strictly above [`MIN_MATCH_IOU`]; damages with no such part
//! are dropped.

use serde::{Deserialize, Serialize};

use crate::defects::DefectType;
use crate::observation::{DefectObservation, MAX_SEVERITY};
use crate::parts::CarPart;

/// Minimum overlap for a damage to be attributed to a part.
pub const MIN_MATCH_IOU: f64 = 0.1;

/// Axis-aligned box in pixel coordinates, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area counting both edge pixels.
    pub fn area(&self) -> f64 {
        (self.x2 - self.x1 + 1.0).max(0.0) * (self.y2 - self.y1 + 1.0).max(0.0)
    }
}

/// A labelled detection from one of the detector's models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection<L> {
    pub score: f64,
    pub bbox: BoundingBox,
    pub label: L,
}

/// A damage detection attributed to a part.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedDamage {
    pub defect_type: DefectType,
    pub part: CarPart,
    pub confidence: f64,
    pub iou: f64,
}

impl MatchedDamage {
    /// Turn the match into an observation. The detector has no severity
    /// model, so matches are reported at the given severity.
    pub fn into_observation(self, severity: f64) -> DefectObservation {
        DefectObservation::new(self.part, self.defect_type, severity, self.confidence)
    }

    /// Observation at full severity, as the detector reports today.
    pub fn into_default_observation(self) -> DefectObservation {
        self.into_observation(MAX_SEVERITY)
    }
}

/// Intersection over union of two inclusive pixel boxes.
pub fn compute_iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let inter = BoundingBox::new(a.x1.max(b.x1), a.y1.max(b.y1), a.x2.min(b.x2), a.y2.min(b.y2));
    let inter_area = inter.area();
    let union = a.area() + b.area() - inter_area;
    if union <= 0.0 {
        return 0.0;
    }
    inter_area / union
}

/// Attribute each damage to its best-overlapping part.
pub fn match_damage_to_parts(
    damages: &[Detection<DefectType>],
    parts: &[Detection<CarPart>],
) -> Vec<MatchedDamage> {
    damages
        .iter()
        .filter_map(|damage| {
            parts
                .iter()
                .map(|part| (part, compute_iou(&damage.bbox, &part.bbox)))
                .filter(|(_, iou)| *iou > MIN_MATCH_IOU)
                .fold(None::<(&Detection<CarPart>, f64)>, |best, candidate| match best {
                    Some((_, best_iou)) if best_iou >= candidate.1 => best,
                    _ => Some(candidate),
                })
                .map(|(part, iou)| MatchedDamage {
                    defect_type: damage.label,
                    part: part.label,
                    confidence: damage.score,
                    iou,
                })
        })
        .collect()
}
