//! Read-side connectivity reconciliation.
//!
//! Consumers polling the query surface need one answer to "is any device
//! actually live". The liveness tracker is the primary signal; when it has
//! nothing (fresh process, no heartbeats yet), the most recent stored
//! incident serves as a fallback, with synthetic test records excluded so
//! simulated traffic can never masquerade as field connectivity.

use chrono::Duration;
use serde::Serialize;

use crate::liveness::DeviceStatus;
use crate::types::Timestamp;

/// How recent the latest incident must be for the fallback to report
/// connected.
pub const RECENT_INCIDENT_WINDOW_SECS: i64 = 600;

/// Which signal produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    /// The liveness tracker had entries; its word is authoritative.
    Tracker,
    /// The tracker was empty; the verdict came from stored incidents.
    Incidents,
    /// No usable evidence at all.
    None,
}

/// The reconciled answer handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityVerdict {
    pub connected: bool,
    pub last_seen: Option<Timestamp>,
    pub source: VerdictSource,
}

/// The slice of an incident the reconciliation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentSnapshot {
    pub timestamp: Timestamp,
    pub is_synthetic: bool,
}

/// Reconcile tracker state and the latest incident into one verdict.
///
/// Pure and side-effect free; safe to call concurrently with ingestion.
pub fn resolve_connectivity(
    devices: &[DeviceStatus],
    latest_incident: Option<&IncidentSnapshot>,
    now: Timestamp,
) -> ConnectivityVerdict {
    if !devices.is_empty() {
        let online_last_seen = devices
            .iter()
            .filter(|d| d.online)
            .map(|d| d.last_seen)
            .max();

        if let Some(last_seen) = online_last_seen {
            return ConnectivityVerdict {
                connected: true,
                last_seen: Some(last_seen),
                source: VerdictSource::Tracker,
            };
        }

        // Tracked but all offline: authoritative, no fallback.
        return ConnectivityVerdict {
            connected: false,
            last_seen: devices.iter().map(|d| d.last_seen).max(),
            source: VerdictSource::Tracker,
        };
    }

    match latest_incident {
        Some(incident) if incident.is_synthetic => ConnectivityVerdict {
            connected: false,
            last_seen: None,
            source: VerdictSource::None,
        },
        Some(incident) => {
            let fresh =
                now - incident.timestamp <= Duration::seconds(RECENT_INCIDENT_WINDOW_SECS);
            ConnectivityVerdict {
                connected: fresh,
                last_seen: Some(incident.timestamp),
                source: VerdictSource::Incidents,
            }
        }
        None => ConnectivityVerdict {
            connected: false,
            last_seen: None,
            source: VerdictSource::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn device(id: &str, online: bool, last_seen: Timestamp) -> DeviceStatus {
        DeviceStatus {
            device_id: id.to_string(),
            last_seen,
            online,
        }
    }

    #[test]
    fn any_online_device_wins() {
        let now = Utc::now();
        let devices = vec![
            device("ESP32-BUS-001", false, now - Duration::hours(3)),
            device("ESP32-BUS-002", true, now - Duration::minutes(2)),
            device("ESP32-BUS-003", true, now - Duration::minutes(20)),
        ];

        let verdict = resolve_connectivity(&devices, None, now);
        assert!(verdict.connected);
        assert_eq!(verdict.source, VerdictSource::Tracker);
        // Most recent online timestamp, not the most recent overall.
        assert_eq!(verdict.last_seen, Some(now - Duration::minutes(2)));
    }

    #[test]
    fn all_offline_is_authoritative_even_with_a_fresh_incident() {
        let now = Utc::now();
        let devices = vec![device("ESP32-BUS-001", false, now - Duration::hours(2))];
        let incident = IncidentSnapshot {
            timestamp: now - Duration::minutes(1),
            is_synthetic: false,
        };

        let verdict = resolve_connectivity(&devices, Some(&incident), now);
        assert!(!verdict.connected);
        assert_eq!(verdict.source, VerdictSource::Tracker);
    }

    #[test]
    fn fallback_accepts_a_fresh_genuine_incident() {
        let now = Utc::now();
        let incident = IncidentSnapshot {
            timestamp: now - Duration::minutes(5),
            is_synthetic: false,
        };

        let verdict = resolve_connectivity(&[], Some(&incident), now);
        assert!(verdict.connected);
        assert_eq!(verdict.source, VerdictSource::Incidents);
        assert_eq!(verdict.last_seen, Some(incident.timestamp));
    }

    #[test]
    fn fallback_rejects_a_stale_incident() {
        let now = Utc::now();
        let incident = IncidentSnapshot {
            timestamp: now - Duration::minutes(11),
            is_synthetic: false,
        };

        let verdict = resolve_connectivity(&[], Some(&incident), now);
        assert!(!verdict.connected);
        assert_eq!(verdict.source, VerdictSource::Incidents);
    }

    #[test]
    fn fallback_never_trusts_synthetic_records() {
        let now = Utc::now();
        let incident = IncidentSnapshot {
            timestamp: now,
            is_synthetic: true,
        };

        let verdict = resolve_connectivity(&[], Some(&incident), now);
        assert!(!verdict.connected);
        assert_eq!(verdict.source, VerdictSource::None);
        assert_eq!(verdict.last_seen, None);
    }

    #[test]
    fn no_evidence_means_disconnected() {
        let verdict = resolve_connectivity(&[], None, Utc::now());
        assert!(!verdict.connected);
        assert_eq!(verdict.source, VerdictSource::None);
    }
}
