//! Device liveness query/update endpoints.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use roadpulse_core::liveness::DeviceStatus;
use roadpulse_core::types::Timestamp;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub device_id: Option<String>,
}

/// Status of a single queried device. Unknown devices are reported rather
/// than 404ed: "we have never heard from it" is a valid answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDeviceResponse {
    pub device_id: String,
    pub last_seen: Option<Timestamp>,
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceStatus>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Single(SingleDeviceResponse),
    All(DeviceListResponse),
}

/// GET /devices/status
async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusResponse> {
    if let Some(device_id) = query.device_id {
        let liveness = state.tracker.get(&device_id).await;
        return Json(StatusResponse::Single(SingleDeviceResponse {
            device_id,
            last_seen: liveness.map(|l| l.last_seen),
            online: liveness.map(|l| l.online).unwrap_or(false),
        }));
    }

    Json(StatusResponse::All(DeviceListResponse {
        devices: state.tracker.snapshot().await,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub device_id: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub device_id: String,
    pub status: SingleDeviceResponse,
}

/// POST /devices/status
///
/// Applies a tracker mutation: `heartbeat` records evidence of life,
/// `online`/`offline` are the administrative overrides used by reset and
/// test tooling.
async fn update_status(
    State(state): State<AppState>,
    Json(body): Json<StatusUpdate>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let device_id = body
        .device_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("deviceId is required".to_string()))?;

    match body.action.as_deref() {
        Some("heartbeat") => {
            state.tracker.heartbeat(&device_id).await;
            tracing::info!(device_id = %device_id, "Heartbeat received");
        }
        Some("online") => {
            state.tracker.set_online(&device_id, true).await;
            tracing::info!(device_id = %device_id, "Device set online");
        }
        Some("offline") => {
            state.tracker.set_online(&device_id, false).await;
            tracing::info!(device_id = %device_id, "Device set offline");
        }
        _ => {
            return Err(AppError::BadRequest(
                "action must be one of: heartbeat, online, offline".to_string(),
            ));
        }
    }

    let liveness = state.tracker.get(&device_id).await;
    Ok(Json(StatusUpdateResponse {
        success: true,
        device_id: device_id.clone(),
        status: SingleDeviceResponse {
            device_id,
            last_seen: liveness.map(|l| l.last_seen),
            online: liveness.map(|l| l.online).unwrap_or(false),
        },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/devices/status", get(get_status).post(update_status))
}
