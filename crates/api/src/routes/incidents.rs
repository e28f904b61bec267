//! Incident read entry and the lifecycle-status mutation.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roadpulse_core::classify::Severity;
use roadpulse_core::incident::IncidentStatus;
use roadpulse_db::models::incident::IncidentRecord;
use roadpulse_db::store::{IncidentFilter, Page};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentListQuery {
    pub device_id: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct IncidentListResponse {
    pub data: Vec<IncidentRecord>,
    pub count: usize,
}

/// GET /incidents
///
/// Newest-first page, optionally filtered by device id, severity, or status.
async fn list_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentListQuery>,
) -> AppResult<Json<IncidentListResponse>> {
    let severity = query
        .severity
        .map(|s| s.parse::<Severity>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let status = query
        .status
        .map(|s| s.parse::<IncidentStatus>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let filter = IncidentFilter {
        device_id: query.device_id,
        severity,
        status,
    };
    let page = Page::clamped(query.limit, query.offset);

    let data = state.store.list(&filter, page).await?;
    Ok(Json(IncidentListResponse {
        count: data.len(),
        data,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: String,
}

/// PATCH /incidents/{id}/status
///
/// The external workflow actor advances an incident through its lifecycle.
/// The store enforces the forward-only ordering; a backward move is a 409.
async fn update_incident_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateBody>,
) -> AppResult<Json<DataResponse<IncidentRecord>>> {
    let status = body
        .status
        .parse::<IncidentStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state.store.update_status(id, status).await?;
    Ok(Json(DataResponse { data: record }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/incidents", get(list_incidents))
        .route("/incidents/{id}/status", patch(update_incident_status))
}
