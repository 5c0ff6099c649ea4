//! Government vehicle-registry report and its derived summary.
//!
//! The registry answers per section (vehicle history, restrictions,
//! wanted list, accidents, fines, inspections). Any section may be absent
//! when its lookup failed; the summary treats absence as "nothing known".

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisteredVehicle {
    pub vin: Option<String>,
    pub body_number: Option<String>,
    pub engine_number: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub year: Option<String>,
    pub engine_volume: Option<String>,
    pub power_hp: Option<String>,
    pub power_kwt: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub typeinfo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnershipPeriod {
    pub simple_person_type: Option<String>,
    pub simple_person_type_info: Option<String>,
    pub last_operation: Option<String>,
    pub last_operation_info: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub period: Option<String>,
}

/// Response of the vehicle-history lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleHistory {
    pub vehicle: Option<RegisteredVehicle>,
    #[serde(alias = "ownershipPeriod")]
    pub ownership_periods: Vec<OwnershipPeriod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restriction {
    pub osn: Option<String>,
    pub ogrkod: Option<String>,
    pub regname: Option<String>,
    pub ogrdate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WantedInfo {
    pub regname: Option<String>,
    pub reason: Option<String>,
    pub date: Option<String>,
}

/// A recorded road accident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccidentRecord {
    pub date: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "type")]
    pub accident_type: Option<String>,
    pub damage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fine {
    pub article: Option<String>,
    pub date: Option<String>,
    pub number: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<String>,
}

/// A technical inspection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionRecord {
    pub date: Option<String>,
    pub result: Option<String>,
    pub odometer: Option<String>,
    pub station: Option<String>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything the registry returned for one VIN. `None` marks a section
/// whose lookup failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryReport {
    pub vin: String,
    pub history: Option<VehicleHistory>,
    pub restrictions: Option<Vec<Restriction>>,
    pub wanted: Option<Vec<WantedInfo>>,
    pub accidents: Option<Vec<AccidentRecord>>,
    pub fines: Option<Vec<Fine>>,
    pub inspections: Option<Vec<InspectionRecord>>,
}

/// Flattened facts derived from a [`RegistryReport`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySummary {
    pub vin: String,
    pub model: Option<String>,
    pub year: Option<String>,
    pub color: Option<String>,
    pub owners_count: usize,
    pub has_restriction: bool,
    pub is_wanted: bool,
    pub has_accidents: bool,
    pub has_fines: bool,
    pub fines_amount: f64,
}

impl RegistryReport {
    pub fn summary(&self) -> RegistrySummary {
        let vehicle = self.history.as_ref().and_then(|h| h.vehicle.as_ref());
        let fines_amount: f64 = self
            .fines
            .iter()
            .flatten()
            .filter_map(|f| f.amount)
            .sum();

        RegistrySummary {
            vin: self.vin.clone(),
            model: vehicle.and_then(|v| v.model.clone()),
            year: vehicle.and_then(|v| v.year.clone()),
            color: vehicle.and_then(|v| v.color.clone()),
            owners_count: self
                .history
                .as_ref()
                .map_or(0, |h| h.ownership_periods.len()),
            has_restriction: non_empty(&self.restrictions),
            is_wanted: non_empty(&self.wanted),
            has_accidents: non_empty(&self.accidents),
            has_fines: fines_amount > 0.0,
            fines_amount,
        }
    }

    /// True when every section lookup failed.
    pub fn is_empty(&self) -> bool {
        self.history.is_none()
            && self.restrictions.is_none()
            && self.wanted.is_none()
            && self.accidents.is_none()
            && self.fines.is_none()
            && self.inspections.is_none()
    }
}

fn non_empty<T>(section: &Option<Vec<T>>) -> bool {
    section.as_ref().is_some_and(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_empty_report_knows_nothing() {
        let report = RegistryReport {
            vin: "JN1TCAT32U0123456".into(),
            ..Default::default()
        };
        let summary = report.summary();
        assert!(report.is_empty());
        assert_eq!(summary.owners_count, 0);
        assert!(!summary.has_restriction);
        assert!(!summary.has_fines);
        assert_eq!(summary.fines_amount, 0.0);
        assert_eq!(summary.model, None);
    }

    #[test]
    fn summary_derives_flags_and_totals() {
        let report = RegistryReport {
            vin: "JN1TCAT32U0123456".into(),
            history: Some(VehicleHistory {
                vehicle: Some(RegisteredVehicle {
                    model: Some("NISSAN X-TRAIL".into()),
                    year: Some("2012".into()),
                    ..Default::default()
                }),
                ownership_periods: vec![OwnershipPeriod::default(), OwnershipPeriod::default()],
            }),
            restrictions: Some(vec![]),
            wanted: Some(vec![WantedInfo::default()]),
            accidents: None,
            fines: Some(vec![
                Fine {
                    amount: Some(500.0),
                    ..Default::default()
                },
                Fine {
                    amount: Some(1500.0),
                    ..Default::default()
                },
                Fine::default(),
            ]),
            inspections: None,
        };

        let summary = report.summary();
        assert!(!report.is_empty());
        assert_eq!(summary.model.as_deref(), Some("NISSAN X-TRAIL"));
        assert_eq!(summary.owners_count, 2);
        assert!(!summary.has_restriction);
        assert!(summary.is_wanted);
        assert!(!summary.has_accidents);
        assert!(summary.has_fines);
        assert_eq!(summary.fines_amount, 2000.0);
    }

    #[test]
    fn parses_camel_case_registry_payload() {
        let history: VehicleHistory = serde_json::from_str(
            r#"{
                "vehicle": {"vin": "X", "bodyNumber": "B1", "powerHp": "150", "type": "21"},
                "ownershipPeriod": [{"simplePersonType": "Natural", "from": "2012-01-01"}],
                "unknownField": 1
            }"#,
        )
        .unwrap();
        let vehicle = history.vehicle.unwrap();
        assert_eq!(vehicle.body_number.as_deref(), Some("B1"));
        assert_eq!(vehicle.power_hp.as_deref(), Some("150"));
        assert_eq!(vehicle.vehicle_type.as_deref(), Some("21"));
        assert_eq!(history.ownership_periods.len(), 1);
    }

    #[test]
    fn fines_without_amounts_do_not_count() {
        let report = RegistryReport {
            fines: Some(vec![Fine::default()]),
            ..Default::default()
        };
        assert!(!report.summary().has_fines);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let json = serde_json::to_value(RegistryReport::default().summary()).unwrap();
        assert!(json.get("ownersCount").is_some());
        assert!(json.get("finesAmount").is_some());
    }
}
