//! The narrow interface the rest of the system uses to persist and read
//! incidents.

use async_trait::async_trait;
use uuid::Uuid;

use roadpulse_core::classify::Severity;
use roadpulse_core::incident::{IncidentStatus, NewIncident};

use crate::models::incident::IncidentRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("incident {0} not found")]
    NotFound(Uuid),

    #[error("cannot move incident status from {from} to {to}")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation timed out")]
    Timeout,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Filters for the incident read entry. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub device_id: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<IncidentStatus>,
}

/// A bounded page request.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp caller-supplied paging values into a sane range.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Persistence operations for incidents.
///
/// Exactly one record is created per accepted telemetry record; sensor fields
/// are never updated in place. `update_status` is the single post-creation
/// mutation and enforces the forward-only lifecycle.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Persist a classified incident. Sets `status = Reported` and
    /// `created_at = updated_at = now`.
    async fn insert(&self, incident: &NewIncident) -> Result<IncidentRecord, StoreError>;

    /// Most-recent-first page of incidents matching `filter`.
    async fn list(
        &self,
        filter: &IncidentFilter,
        page: Page,
    ) -> Result<Vec<IncidentRecord>, StoreError>;

    /// The most recently created incident, if any. Used by the connectivity
    /// fallback.
    async fn latest(&self) -> Result<Option<IncidentRecord>, StoreError>;

    /// Advance an incident's lifecycle status, bumping `updated_at`.
    async fn update_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
    ) -> Result<IncidentRecord, StoreError>;

    /// Backend reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
