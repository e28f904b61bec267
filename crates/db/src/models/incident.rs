//! Incident entity model.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use roadpulse_core::classify::{Priority, Severity};
use roadpulse_core::incident::IncidentStatus;
use roadpulse_core::telemetry::{Auxiliary, IngestChannel};
use roadpulse_core::types::Timestamp;

/// A row from the `incidents` table.
///
/// The sensor fields (`device_id` through `auxiliary`) are written once at
/// creation and never mutated; `status` and `updated_at` are the only fields
/// that change afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub id: Uuid,
    pub device_id: String,
    /// Observation time: server receive time for relay records, the
    /// device-reported time for direct records.
    pub timestamp: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub vibration_intensity: f64,
    #[sqlx(try_from = "String")]
    pub channel: IngestChannel,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    #[sqlx(try_from = "String")]
    pub status: IncidentStatus,
    pub is_synthetic: bool,
    #[sqlx(json)]
    pub auxiliary: Auxiliary,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
