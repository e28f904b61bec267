//! Normalized telemetry records.
//!
//! The two ingestion channels accept structurally different payloads (a
//! pipe-delimited text line from the SMS relay, a JSON document from the
//! direct entry) but converge on one [`TelemetryRecord`] type here. The
//! constructors are the only way to build one, so the mandatory-field
//! invariant (device id, location, intensity) holds everywhere downstream.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ParseEnumError};
use crate::protocol::WireMessage;
use crate::types::{GeoPoint, Timestamp};

/// Which entry point a record arrived through. Set at construction, never
/// inferred after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestChannel {
    /// The SMS relay webhook.
    Relay,
    /// A direct HTTP call from a device or backup integration.
    Direct,
}

impl IngestChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestChannel::Relay => "relay",
            IngestChannel::Direct => "direct",
        }
    }
}

impl std::fmt::Display for IngestChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestChannel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relay" => Ok(IngestChannel::Relay),
            "direct" => Ok(IngestChannel::Direct),
            other => Err(ParseEnumError {
                value: other.to_string(),
                expected: &["relay", "direct"],
            }),
        }
    }
}

impl TryFrom<String> for IngestChannel {
    type Error = ParseEnumError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Accelerometer sample attached by devices with an IMU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accelerometer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Optional sensor context carried alongside the mandatory fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auxiliary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerometer: Option<Accelerometer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellites: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    /// The untouched wire payload, kept for relay-sourced records so a
    /// rejected or mis-parsed report can be reconstructed by hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
}

/// One observation from a device, immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub device_id: String,
    pub timestamp: Timestamp,
    pub location: GeoPoint,
    pub vibration_intensity: f64,
    pub channel: IngestChannel,
    pub auxiliary: Auxiliary,
}

impl TelemetryRecord {
    /// Build a relay-channel record from a decoded wire message.
    ///
    /// The device clock is not trusted on this channel, so `received_at` (the
    /// server receive time) becomes the record timestamp regardless of the
    /// wire `TIME` field. A pothole report without an `INT` segment cannot be
    /// classified and is rejected.
    pub fn from_wire(
        msg: &WireMessage,
        received_at: Timestamp,
        raw_payload: &str,
    ) -> Result<Self, CoreError> {
        let vibration_intensity = msg.intensity.ok_or_else(|| {
            CoreError::Validation("INT is required for POTHOLE reports".to_string())
        })?;

        Ok(Self {
            device_id: msg.device_id.clone(),
            timestamp: received_at,
            location: GeoPoint {
                latitude: msg.latitude,
                longitude: msg.longitude,
            },
            vibration_intensity,
            channel: IngestChannel::Relay,
            auxiliary: Auxiliary {
                accelerometer: None,
                satellites: msg.satellites,
                battery_level: None,
                raw_payload: Some(raw_payload.to_string()),
            },
        })
    }

    /// Build a direct-channel record from already-validated parts.
    ///
    /// The caller has checked the payload shape; this enforces the remaining
    /// invariant that a device id is never empty.
    pub fn direct(
        device_id: String,
        timestamp: Timestamp,
        location: GeoPoint,
        vibration_intensity: f64,
        auxiliary: Auxiliary,
    ) -> Result<Self, CoreError> {
        if device_id.is_empty() {
            return Err(CoreError::Validation("deviceId must not be empty".to_string()));
        }

        Ok(Self {
            device_id,
            timestamp,
            location,
            vibration_intensity,
            channel: IngestChannel::Direct,
            auxiliary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol;
    use assert_matches::assert_matches;
    use chrono::Utc;

    #[test]
    fn relay_records_use_server_time() {
        let raw = "ROADPULSE|DEV:ESP32-BUS-001|LAT:19.0|LNG:72.8|INT:90.0|TIME:123456|TYPE:POTHOLE";
        let msg = protocol::parse(raw).unwrap();
        let received_at = Utc::now();
        let record = TelemetryRecord::from_wire(&msg, received_at, raw).unwrap();

        assert_eq!(record.timestamp, received_at);
        assert_eq!(record.channel, IngestChannel::Relay);
        assert_eq!(record.auxiliary.raw_payload.as_deref(), Some(raw));
    }

    #[test]
    fn pothole_without_intensity_is_rejected() {
        let raw = "ROADPULSE|DEV:ESP32-BUS-001|LAT:19.0|LNG:72.8|TYPE:POTHOLE";
        let msg = protocol::parse(raw).unwrap();
        assert_matches!(
            TelemetryRecord::from_wire(&msg, Utc::now(), raw),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn direct_records_reject_empty_device_id() {
        let result = TelemetryRecord::direct(
            String::new(),
            Utc::now(),
            GeoPoint {
                latitude: 19.0,
                longitude: 72.8,
            },
            40.0,
            Auxiliary::default(),
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
