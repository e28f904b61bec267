//! RoadPulse domain core.
//!
//! Pure ingestion and liveness logic shared by the server crates: the wire
//! protocol parser, the severity classifier, telemetry normalization, the
//! device liveness tracker, and connectivity reconciliation. No I/O happens
//! here beyond the tracker's in-memory state.

pub mod classify;
pub mod connectivity;
pub mod error;
pub mod incident;
pub mod liveness;
pub mod protocol;
pub mod telemetry;
pub mod types;
