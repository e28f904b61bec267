//! Per-device liveness tracking.
//!
//! [`LivenessTracker`] owns the process-wide map of device ids to last-seen
//! timestamps and online flags. Every successful ingestion touches it, and a
//! periodic sweep decays devices that have gone quiet. All mutations go
//! through this component so the locking discipline lives in one place;
//! readers get a point-in-time snapshot that may lag the latest write by a
//! small interval, which is fine for this system.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::types::Timestamp;

/// A device is considered offline once it has been silent this long.
pub const OFFLINE_THRESHOLD_SECS: u64 = 3600;

/// How often the background sweep runs.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

/// Liveness state for one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceLiveness {
    pub last_seen: Timestamp,
    pub online: bool,
}

/// A device's liveness state paired with its id, as returned to readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub device_id: String,
    pub last_seen: Timestamp,
    pub online: bool,
}

/// Process-wide device liveness map.
///
/// Shared as `Arc<LivenessTracker>`; created on startup and handed to the
/// ingestion paths, the status endpoints, and the sweep task.
#[derive(Debug, Default)]
pub struct LivenessTracker {
    devices: RwLock<HashMap<String, DeviceLiveness>>,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record evidence of life: `last_seen = now`, `online = true`.
    ///
    /// Called for every successful ingestion, heartbeat or incident alike.
    pub async fn heartbeat(&self, device_id: &str) {
        let mut devices = self.devices.write().await;
        devices.insert(
            device_id.to_string(),
            DeviceLiveness {
                last_seen: Utc::now(),
                online: true,
            },
        );
    }

    /// Administrative override, independent of timestamps.
    ///
    /// Marking a device online refreshes `last_seen` so the next sweep does
    /// not immediately undo the override. Marking an unknown device offline
    /// registers it, so the tracker remembers it was administratively
    /// silenced.
    pub async fn set_online(&self, device_id: &str, online: bool) {
        let mut devices = self.devices.write().await;
        match devices.get_mut(device_id) {
            Some(device) if !online => device.online = false,
            _ => {
                devices.insert(
                    device_id.to_string(),
                    DeviceLiveness {
                        last_seen: Utc::now(),
                        online,
                    },
                );
            }
        }
    }

    /// Mark every device not seen within `offline_after` of `now` as offline.
    ///
    /// Returns how many devices transitioned. This is the only mutation that
    /// takes a device offline purely from the passage of time.
    pub async fn sweep(&self, now: Timestamp, offline_after: Duration) -> usize {
        let mut devices = self.devices.write().await;
        let mut transitioned = 0;
        for device in devices.values_mut() {
            if device.online && now - device.last_seen > offline_after {
                device.online = false;
                transitioned += 1;
            }
        }
        transitioned
    }

    pub async fn get(&self, device_id: &str) -> Option<DeviceLiveness> {
        self.devices.read().await.get(device_id).copied()
    }

    /// Point-in-time view of every tracked device, sorted by device id for
    /// stable output.
    pub async fn snapshot(&self) -> Vec<DeviceStatus> {
        let devices = self.devices.read().await;
        let mut statuses: Vec<DeviceStatus> = devices
            .iter()
            .map(|(device_id, liveness)| DeviceStatus {
                device_id: device_id.clone(),
                last_seen: liveness.last_seen,
                online: liveness.online,
            })
            .collect();
        statuses.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn heartbeat_brings_a_device_online() {
        let tracker = LivenessTracker::new();
        assert_eq!(tracker.get("ESP32-BUS-001").await, None);

        tracker.heartbeat("ESP32-BUS-001").await;
        let state = tracker.get("ESP32-BUS-001").await.unwrap();
        assert!(state.online);
    }

    #[tokio::test]
    async fn sweep_honors_the_offline_threshold() {
        let tracker = LivenessTracker::new();
        tracker.heartbeat("ESP32-BUS-001").await;
        let last_seen = tracker.get("ESP32-BUS-001").await.unwrap().last_seen;

        // Just inside the window: stays online.
        let transitioned = tracker
            .sweep(last_seen + Duration::minutes(59), Duration::hours(1))
            .await;
        assert_eq!(transitioned, 0);
        assert!(tracker.get("ESP32-BUS-001").await.unwrap().online);

        // Past the window: goes offline.
        let transitioned = tracker
            .sweep(last_seen + Duration::minutes(61), Duration::hours(1))
            .await;
        assert_eq!(transitioned, 1);
        assert!(!tracker.get("ESP32-BUS-001").await.unwrap().online);

        // Sweeping again is a no-op; the device is already offline.
        let transitioned = tracker
            .sweep(last_seen + Duration::minutes(62), Duration::hours(1))
            .await;
        assert_eq!(transitioned, 0);
    }

    #[tokio::test]
    async fn device_can_cycle_offline_and_back() {
        let tracker = LivenessTracker::new();
        tracker.heartbeat("ESP32-BUS-001").await;
        tracker.set_online("ESP32-BUS-001", false).await;
        assert!(!tracker.get("ESP32-BUS-001").await.unwrap().online);

        tracker.heartbeat("ESP32-BUS-001").await;
        assert!(tracker.get("ESP32-BUS-001").await.unwrap().online);
    }

    #[tokio::test]
    async fn explicit_offline_registers_unknown_devices() {
        let tracker = LivenessTracker::new();
        tracker.set_online("ESP32-BUS-009", false).await;
        let state = tracker.get("ESP32-BUS-009").await.unwrap();
        assert!(!state.online);
    }

    #[tokio::test]
    async fn explicit_offline_keeps_last_seen() {
        let tracker = LivenessTracker::new();
        tracker.heartbeat("ESP32-BUS-001").await;
        let before = tracker.get("ESP32-BUS-001").await.unwrap().last_seen;

        tracker.set_online("ESP32-BUS-001", false).await;
        let state = tracker.get("ESP32-BUS-001").await.unwrap();
        assert_eq!(state.last_seen, before);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_heartbeats_for_distinct_devices_commute() {
        let tracker = Arc::new(LivenessTracker::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                tokio::spawn(async move {
                    tracker.heartbeat(&format!("ESP32-BUS-{i:03}")).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.len(), 32);
        assert!(snapshot.iter().all(|d| d.online));
    }

    #[tokio::test]
    async fn snapshot_is_sorted_by_device_id() {
        let tracker = LivenessTracker::new();
        tracker.heartbeat("ESP32-BUS-002").await;
        tracker.heartbeat("ESP32-BUS-001").await;

        let ids: Vec<_> = tracker
            .snapshot()
            .await
            .into_iter()
            .map(|d| d.device_id)
            .collect();
        assert_eq!(ids, vec!["ESP32-BUS-001", "ESP32-BUS-002"]);
    }
}
