//! The single write path both ingestion channels funnel through.
//!
//! Channel handlers normalize their wire payloads into a
//! [`TelemetryRecord`], then call [`ingest_incident`]. Classification,
//! the bounded-timeout store write, the best-effort liveness update, and the
//! live-feed publish all happen here so the two channels cannot drift apart.

use std::time::Duration;

use roadpulse_core::incident::NewIncident;
use roadpulse_core::telemetry::TelemetryRecord;
use roadpulse_db::models::incident::IncidentRecord;
use roadpulse_db::store::StoreError;

use crate::events::IncidentEvent;
use crate::state::AppState;

/// What became of one ingestion attempt.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The incident was classified and persisted.
    Stored(IncidentRecord),
    /// Classification succeeded but the store write failed or timed out.
    /// The full record has been logged for manual recovery; liveness was
    /// still updated. The caller decides how to surface this per channel.
    Degraded {
        device_id: String,
        intensity: f64,
        error: StoreError,
    },
}

/// Classify, persist, and account for one telemetry record.
///
/// Liveness is updated before returning whatever the storage outcome, but
/// only for genuine field traffic: synthetic test records must never make a
/// device look alive.
pub async fn ingest_incident(
    state: &AppState,
    telemetry: TelemetryRecord,
    is_synthetic: bool,
) -> IngestOutcome {
    let incident = NewIncident::from_telemetry(telemetry, is_synthetic);
    let device_id = incident.telemetry.device_id.clone();
    let intensity = incident.telemetry.vibration_intensity;

    let timeout = Duration::from_secs(state.config.storage_timeout_secs);
    let result = match tokio::time::timeout(timeout, state.store.insert(&incident)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    };

    if !is_synthetic {
        state.tracker.heartbeat(&device_id).await;
    }

    match result {
        Ok(record) => {
            tracing::info!(
                incident_id = %record.id,
                device_id = %record.device_id,
                severity = %record.severity,
                channel = %record.channel,
                "Incident stored"
            );
            state.feed.publish(IncidentEvent::from(&record));
            IngestOutcome::Stored(record)
        }
        Err(error) => {
            // Enough detail to reconstruct the lost record by hand.
            tracing::error!(
                error = %error,
                record = ?incident.telemetry,
                severity = %incident.severity,
                "Failed to persist incident; record logged for manual recovery"
            );
            IngestOutcome::Degraded {
                device_id,
                intensity,
                error,
            }
        }
    }
}
