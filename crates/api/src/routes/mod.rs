pub mod connectivity;
pub mod devices;
pub mod health;
pub mod incidents;
pub mod live;
pub mod relay;
pub mod simulate;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ingest/relay              POST  relay-channel ingestion (form-encoded)
/// /ingest/relay              GET   webhook liveness probe
/// /ingest/telemetry          POST  direct-channel ingestion (JSON)
///
/// /devices/status            GET   all tracked devices (?deviceId= for one)
/// /devices/status            POST  heartbeat / online / offline actions
///
/// /incidents                 GET   newest-first page, filterable
/// /incidents/{id}/status     PATCH advance lifecycle status
///
/// /connectivity              GET   reconciled connectivity verdict
/// /live                      GET   SSE stream of stored incidents
/// /simulate                  POST  generate one synthetic test record
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(relay::router())
        .merge(telemetry::router())
        .merge(devices::router())
        .merge(incidents::router())
        .merge(connectivity::router())
        .merge(live::router())
        .merge(simulate::router())
}
