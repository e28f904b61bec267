//! Line-oriented wire protocol for relayed sensor reports.
//!
//! Devices that report through the SMS relay send a single pipe-delimited
//! line:
//!
//! ```text
//! ROADPULSE|DEV:ESP32-BUS-001|LAT:19.076000|LNG:72.877700|INT:85.0|TIME:123456|SATS:8|TYPE:POTHOLE
//! ```
//!
//! Segments are `KEY:VALUE` pairs. Unknown keys are ignored so newer firmware
//! can add fields without breaking older servers. Parsing is pure and must
//! never panic, whatever the input.

use serde::{Deserialize, Serialize};

/// Magic prefix every relayed payload must carry.
pub const PAYLOAD_PREFIX: &str = "ROADPULSE|";

/// What a relayed message reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    /// A road-surface anomaly detection.
    Pothole,
    /// A keep-alive with no incident attached.
    Heartbeat,
}

/// A decoded wire payload.
///
/// Field presence mirrors the wire: `DEV`, `LAT`, `LNG`, and `TYPE` are
/// guaranteed present by [`parse`]; everything else is optional. Heartbeats
/// normally omit `INT`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireMessage {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub intensity: Option<f64>,
    pub timestamp: Option<i64>,
    pub satellites: Option<i64>,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("payload does not start with the ROADPULSE prefix")]
    BadPrefix,

    #[error("field {0} is not numeric")]
    BadField(&'static str),

    #[error("missing required field: DEV, LAT, LNG and TYPE are mandatory")]
    MissingRequired,

    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),
}

/// Decode a relayed payload into a [`WireMessage`].
///
/// Fails closed: a recognized numeric field that does not parse is an error
/// rather than a silently dropped value.
pub fn parse(payload: &str) -> Result<WireMessage, ParseError> {
    let rest = payload
        .strip_prefix(PAYLOAD_PREFIX)
        .ok_or(ParseError::BadPrefix)?;

    let mut device_id: Option<&str> = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut intensity = None;
    let mut timestamp = None;
    let mut satellites = None;
    let mut kind_raw: Option<&str> = None;

    for segment in rest.split('|') {
        // Segments without a colon carry nothing we understand.
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        match key {
            "DEV" => device_id = Some(value),
            "LAT" => latitude = Some(parse_float("LAT", value)?),
            "LNG" => longitude = Some(parse_float("LNG", value)?),
            "INT" => intensity = Some(parse_float("INT", value)?),
            "TIME" => timestamp = Some(parse_int("TIME", value)?),
            "SATS" => satellites = Some(parse_int("SATS", value)?),
            "TYPE" => kind_raw = Some(value),
            _ => {}
        }
    }

    let (Some(device_id), Some(latitude), Some(longitude), Some(kind_raw)) =
        (device_id, latitude, longitude, kind_raw)
    else {
        return Err(ParseError::MissingRequired);
    };
    if device_id.is_empty() {
        return Err(ParseError::MissingRequired);
    }

    let kind = match kind_raw {
        "POTHOLE" => MessageKind::Pothole,
        "HEARTBEAT" => MessageKind::Heartbeat,
        other => return Err(ParseError::UnknownMessageType(other.to_string())),
    };

    Ok(WireMessage {
        device_id: device_id.to_string(),
        latitude,
        longitude,
        intensity,
        timestamp,
        satellites,
        kind,
    })
}

fn parse_float(key: &'static str, value: &str) -> Result<f64, ParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::BadField(key))
}

fn parse_int(key: &'static str, value: &str) -> Result<i64, ParseError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::BadField(key))
}
