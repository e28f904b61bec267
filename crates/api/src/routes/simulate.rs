//! Synthetic test traffic generator.
//!
//! Produces one randomized direct-channel reading near a fixed reference
//! coordinate and pushes it through the normal ingestion path. The record is
//! flagged `is_synthetic` at creation, so it exercises classification and
//! storage end to end while staying invisible to the connectivity verdict
//! and the liveness tracker.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use roadpulse_core::telemetry::{Accelerometer, Auxiliary, TelemetryRecord};
use roadpulse_core::types::GeoPoint;
use roadpulse_db::models::incident::IncidentRecord;

use crate::error::AppResult;
use crate::ingest::{ingest_incident, IngestOutcome};
use crate::state::AppState;

const TEST_DEVICE_ID: &str = "ESP32-BUS-TEST";

// Reference coordinate the generated readings scatter around.
const REFERENCE_LAT: f64 = 19.0760;
const REFERENCE_LNG: f64 = 72.8777;

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub success: bool,
    pub message: &'static str,
    pub incident: IncidentRecord,
}

/// POST /simulate
async fn simulate(State(state): State<AppState>) -> AppResult<(StatusCode, Json<SimulateResponse>)> {
    let telemetry = {
        let mut rng = rand::rng();

        TelemetryRecord::direct(
            TEST_DEVICE_ID.to_string(),
            Utc::now(),
            GeoPoint {
                latitude: REFERENCE_LAT + rng.random_range(-0.005..0.005),
                longitude: REFERENCE_LNG + rng.random_range(-0.005..0.005),
            },
            75.0 + rng.random_range(0.0..20.0),
            Auxiliary {
                accelerometer: Some(Accelerometer {
                    x: rng.random_range(-1.0..1.0),
                    y: rng.random_range(-1.0..1.0),
                    z: 1.0 + rng.random_range(-0.25..0.25),
                }),
                satellites: None,
                battery_level: Some(80.0 + rng.random_range(0.0..20.0)),
                raw_payload: None,
            },
        )?
    };

    match ingest_incident(&state, telemetry, true).await {
        IngestOutcome::Stored(incident) => Ok((
            StatusCode::CREATED,
            Json(SimulateResponse {
                success: true,
                message: "Synthetic test record stored",
                incident,
            }),
        )),
        IngestOutcome::Degraded { error, .. } => Err(error.into()),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/simulate", post(simulate))
}
