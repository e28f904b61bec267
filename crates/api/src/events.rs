//! In-process feed of newly stored incidents.
//!
//! [`IncidentFeed`] is a small publish/subscribe hub backed by a
//! `tokio::sync::broadcast` channel. The ingestion write path publishes one
//! event per stored incident; the live stream endpoint fans them out to
//! connected consumers. Slow consumers lag and skip ahead rather than
//! applying backpressure to ingestion.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use roadpulse_core::classify::{Priority, Severity};
use roadpulse_core::telemetry::IngestChannel;
use roadpulse_core::types::Timestamp;
use roadpulse_db::models::incident::IncidentRecord;

/// Default capacity of the broadcast buffer.
const FEED_CAPACITY: usize = 256;

/// A newly stored incident, as pushed to live consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentEvent {
    pub id: Uuid,
    pub device_id: String,
    pub channel: IngestChannel,
    pub severity: Severity,
    pub priority: Priority,
    pub vibration_intensity: f64,
    pub created_at: Timestamp,
}

impl From<&IncidentRecord> for IncidentEvent {
    fn from(record: &IncidentRecord) -> Self {
        Self {
            id: record.id,
            device_id: record.device_id.clone(),
            channel: record.channel,
            severity: record.severity,
            priority: record.priority,
            vibration_intensity: record.vibration_intensity,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IncidentFeed {
    tx: broadcast::Sender<IncidentEvent>,
}

impl IncidentFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: IncidentEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IncidentEvent> {
        self.tx.subscribe()
    }
}

impl Default for IncidentFeed {
    fn default() -> Self {
        Self::new()
    }
}
