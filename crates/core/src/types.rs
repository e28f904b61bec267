use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used across the system.
pub type Timestamp = DateTime<Utc>;

/// A WGS-84 coordinate pair reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}
