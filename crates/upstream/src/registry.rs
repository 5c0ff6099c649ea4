//! Vehicle registry client.
//!
//! The registry exposes one endpoint selected by a `type` query parameter
//! (`vin`, `restrict`, `wanted`, `dtp`, `fines`, `eaisto`) with the VIN in
//! `val` and an access `token`. Each section is fetched independently; a
//! failed section is logged and left empty in the report.

use std::time::Duration;

use async_trait::async_trait;
use autocheck_core::registry::{
    AccidentRecord, Fine, InspectionRecord, RegistryReport, Restriction, VehicleHistory, WantedInfo,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::UpstreamError;
use crate::http::{parse_response, send};

/// Source of registry reports.
#[async_trait]
pub trait VehicleRegistry: Send + Sync {
    /// Fetch every section for `vin`. Never fails as a whole.
    async fn fetch_report(&self, vin: &str) -> RegistryReport;
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestrictEnvelope {
    restrictions: Vec<Restriction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WantedEnvelope {
    records: Vec<WantedInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccidentEnvelope {
    accidents: Vec<AccidentRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FinesEnvelope {
    fines: Vec<Fine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InspectionEnvelope {
    records: Vec<InspectionRecord>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the registry service.
pub struct RegistryApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl RegistryApi {
    pub fn new(
        api_url: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// Fetch one section and decode it.
    pub async fn fetch_section<T: DeserializeOwned>(
        &self,
        vin: &str,
        section: &str,
    ) -> Result<T, UpstreamError> {
        let mut query = vec![("type", section), ("val", vin)];
        if let Some(token) = self.token.as_deref() {
            query.push(("token", token));
        }

        let response = send(self.client.get(&self.api_url).query(&query)).await?;
        parse_response(response).await
    }

    /// Like [`fetch_section`](Self::fetch_section), logging and swallowing
    /// failures.
    async fn section_or_none<T: DeserializeOwned>(&self, vin: &str, section: &str) -> Option<T> {
        match self.fetch_section(vin, section).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(vin, section, error = %e, "Registry section lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl VehicleRegistry for RegistryApi {
    async fn fetch_report(&self, vin: &str) -> RegistryReport {
        let (history, restrictions, wanted, accidents, fines, inspections) = futures::join!(
            self.section_or_none::<VehicleHistory>(vin, "vin"),
            self.section_or_none::<RestrictEnvelope>(vin, "restrict"),
            self.section_or_none::<WantedEnvelope>(vin, "wanted"),
            self.section_or_none::<AccidentEnvelope>(vin, "dtp"),
            self.section_or_none::<FinesEnvelope>(vin, "fines"),
            self.section_or_none::<InspectionEnvelope>(vin, "eaisto"),
        );

        let report = RegistryReport {
            vin: vin.to_string(),
            history,
            restrictions: restrictions.map(|e| e.restrictions),
            wanted: wanted.map(|e| e.records),
            accidents: accidents.map(|e| e.accidents),
            fines: fines.map(|e| e.fines),
            inspections: inspections.map(|e| e.records),
        };

        if report.is_empty() {
            tracing::warn!(vin, "Registry returned no sections");
        } else {
            tracing::debug!(vin, "Registry report fetched");
        }
        report
    }
}
