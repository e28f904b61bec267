use std::sync::Arc;

use roadpulse_core::liveness::LivenessTracker;
use roadpulse_db::store::IncidentStore;

use crate::config::ServerConfig;
use crate::events::IncidentFeed;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Incident persistence backend (PostgreSQL or in-memory).
    pub store: Arc<dyn IncidentStore>,
    /// Process-wide device liveness map.
    pub tracker: Arc<LivenessTracker>,
    /// Broadcast feed of newly stored incidents, consumed by the live stream.
    pub feed: IncidentFeed,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
