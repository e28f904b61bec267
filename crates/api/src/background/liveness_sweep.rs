//! Periodic decay of device liveness state.
//!
//! Spawns a loop that marks devices offline once they have been silent past
//! the configured threshold. Runs on a fixed interval using
//! `tokio::time::interval`; this sweep is the only thing that can take a
//! device offline purely from time passing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use roadpulse_core::liveness::LivenessTracker;

use crate::config::ServerConfig;

/// Run the liveness sweep loop until `cancel` is triggered.
pub async fn run(tracker: Arc<LivenessTracker>, config: Arc<ServerConfig>, cancel: CancellationToken) {
    let offline_after = chrono::Duration::seconds(config.liveness_offline_secs as i64);
    let mut interval = tokio::time::interval(Duration::from_secs(config.liveness_sweep_secs));

    tracing::info!(
        offline_secs = config.liveness_offline_secs,
        sweep_secs = config.liveness_sweep_secs,
        "Liveness sweep started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Liveness sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let transitioned = tracker.sweep(Utc::now(), offline_after).await;
                if transitioned > 0 {
                    tracing::info!(transitioned, "Liveness sweep: devices marked offline");
                } else {
                    tracing::debug!("Liveness sweep: no stale devices");
                }
            }
        }
    }
}
