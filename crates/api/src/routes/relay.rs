//! Relay-channel ingestion: the SMS webhook.
//!
//! The relay provider delivers each device SMS as a form-encoded POST with
//! the payload in the `Body` field. The provider is a one-shot delivery
//! channel we control no retries for, so the response contract is deliberate:
//! parse failures are rejected, but a storage failure after a successful
//! parse is acknowledged as a warning-success; retrying would not bring the
//! record back, it would only duplicate the device's SMS spend.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use roadpulse_core::protocol::{self, MessageKind};
use roadpulse_core::telemetry::TelemetryRecord;
use roadpulse_core::types::Timestamp;

use crate::ingest::{ingest_incident, IngestOutcome};
use crate::state::AppState;

/// Form fields delivered by the relay provider. Only `Body` matters; the
/// sender and recipient numbers are logged for troubleshooting.
#[derive(Debug, Deserialize)]
pub struct RelayForm {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
}

/// Response envelope for the relay provider.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    /// `success`, `warning`, or `error`.
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            device_id: None,
            intensity: None,
            error: None,
        }
    }

    fn success(message: impl Into<String>, device_id: String, intensity: Option<f64>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            device_id: Some(device_id),
            intensity,
            error: None,
        }
    }
}

/// POST /ingest/relay
async fn receive_relay(
    State(state): State<AppState>,
    Form(form): Form<RelayForm>,
) -> (StatusCode, Json<RelayResponse>) {
    let Some(body) = form.body.filter(|b| !b.is_empty()) else {
        tracing::warn!(from = ?form.from, "Relay webhook without a message body");
        return (
            StatusCode::BAD_REQUEST,
            Json(RelayResponse::error("No message body")),
        );
    };

    tracing::debug!(from = ?form.from, to = ?form.to, payload = %body, "Relay message received");

    let message = match protocol::parse(&body) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(error = %err, payload = %body, "Rejected relay payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(RelayResponse::error(format!("Invalid payload: {err}"))),
            );
        }
    };

    match message.kind {
        MessageKind::Heartbeat => {
            state.tracker.heartbeat(&message.device_id).await;
            tracing::info!(device_id = %message.device_id, "Heartbeat received via relay");
            (
                StatusCode::OK,
                Json(RelayResponse::success(
                    "Heartbeat processed",
                    message.device_id,
                    None,
                )),
            )
        }
        MessageKind::Pothole => {
            let record = match TelemetryRecord::from_wire(&message, Utc::now(), &body) {
                Ok(record) => record,
                Err(err) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(RelayResponse::error(err.to_string())),
                    );
                }
            };

            match ingest_incident(&state, record, false).await {
                IngestOutcome::Stored(incident) => (
                    StatusCode::OK,
                    Json(RelayResponse::success(
                        "Telemetry processed and stored",
                        incident.device_id,
                        Some(incident.vibration_intensity),
                    )),
                ),
                IngestOutcome::Degraded {
                    device_id,
                    intensity,
                    ..
                } => (
                    // Acknowledged despite the failure; see module docs.
                    StatusCode::OK,
                    Json(RelayResponse {
                        status: "warning",
                        message: "Telemetry processed but storage failed".to_string(),
                        device_id: Some(device_id),
                        intensity: Some(intensity),
                        error: Some("Database storage failed".to_string()),
                    }),
                ),
            }
        }
    }
}

/// Probe response for webhook configuration checks.
#[derive(Debug, Serialize)]
pub struct RelayProbeResponse {
    pub status: &'static str,
    pub timestamp: Timestamp,
}

/// GET /ingest/relay -- lets the relay provider verify the endpoint is up.
async fn probe() -> Json<RelayProbeResponse> {
    Json(RelayProbeResponse {
        status: "RoadPulse relay webhook is running",
        timestamp: Utc::now(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ingest/relay", post(receive_relay).get(probe))
}
