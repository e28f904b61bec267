//! Shared response envelope types for API handlers.
//!
//! List-style endpoints use a `{ "data": ... }` envelope. The two ingestion
//! entries keep their channel-specific envelopes (see `routes::relay` and
//! `routes::telemetry`) because those shapes are part of the wire contract
//! with the relay provider and the device firmware.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
