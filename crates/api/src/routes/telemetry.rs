//! Direct-channel ingestion: devices (or a backup integration) POSTing JSON
//! straight to us.
//!
//! Unlike the relay, the caller here controls its own retry policy, so
//! storage failures surface as 5xx instead of being swallowed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roadpulse_core::error::CoreError;
use roadpulse_core::telemetry::{Accelerometer, Auxiliary, TelemetryRecord};
use roadpulse_core::types::{GeoPoint, Timestamp};

use crate::error::AppResult;
use crate::ingest::{ingest_incident, IngestOutcome};
use crate::state::AppState;

/// Direct-channel request body.
///
/// Every field is optional at the serde level so shape problems surface as
/// our own validation error rather than a deserializer rejection; unknown
/// fields (e.g. extra sensor blocks from newer firmware) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectTelemetry {
    pub device_id: Option<String>,
    /// Device-reported time: RFC 3339 or epoch milliseconds. Unparseable or
    /// absent values fall back to the server receive time.
    pub timestamp: Option<String>,
    pub location: Option<LocationBody>,
    pub vibration_intensity: Option<f64>,
    pub accelerometer: Option<Accelerometer>,
    pub battery_level: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponse {
    pub success: bool,
    pub incident_id: Uuid,
    pub message: &'static str,
}

fn parse_device_timestamp(raw: Option<&str>, received_at: Timestamp) -> Timestamp {
    let Some(raw) = raw else {
        return received_at;
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(millis) = raw.parse::<i64>() {
        if let Some(parsed) = DateTime::from_timestamp_millis(millis) {
            return parsed;
        }
    }
    received_at
}

/// POST /ingest/telemetry
async fn ingest_direct(
    State(state): State<AppState>,
    Json(body): Json<DirectTelemetry>,
) -> AppResult<(StatusCode, Json<DirectResponse>)> {
    let device_id = body
        .device_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CoreError::Validation("deviceId is required".to_string()))?;
    let intensity = body
        .vibration_intensity
        .ok_or_else(|| CoreError::Validation("vibrationIntensity is required".to_string()))?;
    let location = body
        .location
        .ok_or_else(|| CoreError::Validation("location is required".to_string()))?;

    if !device_id.starts_with(&state.config.device_id_prefix) {
        return Err(CoreError::Forbidden("Unauthorized device".to_string()).into());
    }

    let received_at = Utc::now();
    let telemetry = TelemetryRecord::direct(
        device_id,
        parse_device_timestamp(body.timestamp.as_deref(), received_at),
        GeoPoint {
            latitude: location.latitude,
            longitude: location.longitude,
        },
        intensity,
        Auxiliary {
            accelerometer: body.accelerometer,
            satellites: None,
            battery_level: body.battery_level,
            raw_payload: None,
        },
    )?;

    match ingest_incident(&state, telemetry, false).await {
        IngestOutcome::Stored(incident) => Ok((
            StatusCode::CREATED,
            Json(DirectResponse {
                success: true,
                incident_id: incident.id,
                message: "Telemetry received and processed",
            }),
        )),
        IngestOutcome::Degraded { error, .. } => Err(error.into()),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ingest/telemetry", post(ingest_direct))
}
