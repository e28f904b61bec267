//! Incident lifecycle types and the write-side incident value.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Priority, Severity};
use crate::error::ParseEnumError;
use crate::telemetry::TelemetryRecord;

/// Lifecycle state of a persisted incident.
///
/// Transitions move forward only (`Reported` -> `Verified` -> `InProgress`
/// -> `Completed`). The workflow that decides *when* to advance lives outside
/// this core; the ordering guard here is what the storage layer enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    Verified,
    InProgress,
    Completed,
}

impl IncidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Reported => "reported",
            IncidentStatus::Verified => "verified",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Completed => "completed",
        }
    }

    /// Whether moving to `next` respects the forward-only lifecycle.
    ///
    /// Re-asserting the current status is not an advance and is rejected, so
    /// every accepted transition produces an observable `updated_at` bump.
    pub fn can_advance_to(self, next: IncidentStatus) -> bool {
        next > self
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reported" => Ok(IncidentStatus::Reported),
            "verified" => Ok(IncidentStatus::Verified),
            "in_progress" => Ok(IncidentStatus::InProgress),
            "completed" => Ok(IncidentStatus::Completed),
            other => Err(ParseEnumError {
                value: other.to_string(),
                expected: &["reported", "verified", "in_progress", "completed"],
            }),
        }
    }
}

impl TryFrom<String> for IncidentStatus {
    type Error = ParseEnumError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The classified write-side value handed to the incident store.
///
/// Severity and priority are derived from the telemetry intensity by
/// [`NewIncident::from_telemetry`]; there is no other way to set them, which
/// keeps the pair coupled.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub telemetry: TelemetryRecord,
    pub severity: Severity,
    pub priority: Priority,
    /// Set for records produced by the test-traffic generator. Synthetic
    /// records are stored and listed like any other but never count as
    /// evidence of field connectivity.
    pub is_synthetic: bool,
}

impl NewIncident {
    pub fn from_telemetry(telemetry: TelemetryRecord, is_synthetic: bool) -> Self {
        let (severity, priority) = classify(telemetry.vibration_intensity);
        Self {
            telemetry,
            severity,
            priority,
            is_synthetic,
        }
    }
}
