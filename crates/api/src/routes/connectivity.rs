//! The reconciled "is anything actually live" query surface.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use roadpulse_core::connectivity::{resolve_connectivity, ConnectivityVerdict, IncidentSnapshot};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /connectivity
///
/// Combines the liveness tracker snapshot with the most recent stored
/// incident. Read-only; tracker state is never mutated here.
async fn get_connectivity(State(state): State<AppState>) -> AppResult<Json<ConnectivityVerdict>> {
    let devices = state.tracker.snapshot().await;
    let latest = state.store.latest().await?.map(|record| IncidentSnapshot {
        // The fallback judges recency by when we stored the record, not the
        // device-reported observation time.
        timestamp: record.created_at,
        is_synthetic: record.is_synthetic,
    });

    Ok(Json(resolve_connectivity(
        &devices,
        latest.as_ref(),
        Utc::now(),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/connectivity", get(get_connectivity))
}
