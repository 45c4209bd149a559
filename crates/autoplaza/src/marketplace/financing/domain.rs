use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::validation::{ValidationError, Violations};

/// Identifier wrapper for bank partners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankPartnerId(pub String);

/// Severity scale used by the partner-relations team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Baja,
    Media,
    Alta,
    Critica,
}

impl IncidentSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            IncidentSeverity::Baja => "baja",
            IncidentSeverity::Media => "media",
            IncidentSeverity::Alta => "alta",
            IncidentSeverity::Critica => "critica",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "baja" => Some(Self::Baja),
            "media" => Some(Self::Media),
            "alta" => Some(Self::Alta),
            "critica" | "crítica" => Some(Self::Critica),
            _ => None,
        }
    }
}

/// Service complaint logged against a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: IncidentSeverity,
    #[serde(default)]
    pub description: Option<String>,
    pub reported_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
}

/// Aggregate over a partner's incident list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: usize,
    pub unresolved: usize,
    pub last_incident: Option<DateTime<Utc>>,
}

impl IncidentStats {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        incidents
            .iter()
            .fold(Self::default(), |mut stats, incident| {
                stats.total += 1;
                if !incident.resolved {
                    stats.unresolved += 1;
                }
                stats.last_incident = match stats.last_incident {
                    Some(last) if last >= incident.reported_at => Some(last),
                    _ => Some(incident.reported_at),
                };
                stats
            })
    }
}

/// Lender offering vehicle credit through the marketplace.
///
/// Incident statistics are not stored: [`BankPartner::incident_stats`] recomputes them
/// from `incidents` on every read, so any stats a storage layer might carry are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankPartner {
    pub id: BankPartnerId,
    pub name: String,
    /// Annual rate, in percent.
    pub credit_rate: f64,
    pub min_term: u16,
    pub max_term: u16,
    #[serde(default)]
    pub min_vehicle_year: Option<u16>,
    #[serde(default)]
    pub requirements: BTreeSet<String>,
    /// Days from application to disbursement.
    pub processing_time: u16,
    pub is_active: bool,
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

impl BankPartner {
    pub fn incident_stats(&self) -> IncidentStats {
        IncidentStats::from_incidents(&self.incidents)
    }

    pub fn record_incident(&mut self, incident: Incident) -> IncidentStats {
        self.incidents.push(incident);
        self.incident_stats()
    }

    pub fn resolve_incident(&mut self, index: usize) -> Result<IncidentStats, PartnerError> {
        let incident = self
            .incidents
            .get_mut(index)
            .ok_or(PartnerError::IncidentNotFound { index })?;
        incident.resolved = true;
        Ok(self.incident_stats())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.require_text("name", &self.name);
        if !self.credit_rate.is_finite() || self.credit_rate < 0.0 {
            violations.push("creditRate", "must be a non-negative percentage");
        }
        if self.min_term > self.max_term {
            violations.push(
                "minTerm",
                format!(
                    "must not exceed maxTerm ({} > {})",
                    self.min_term, self.max_term
                ),
            );
        }
        violations.finish()
    }
}

/// Credit request submitted to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRequest {
    pub amount: u64,
    /// Months.
    pub term: u16,
    #[serde(default)]
    pub vehicle_year: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("incident #{index} does not exist")]
    IncidentNotFound { index: usize },
}
