//! In-memory incident store.
//!
//! Backs integration tests and storage-less deployments (no `DATABASE_URL`).
//! Semantics match the PostgreSQL store: newest-first listing, forward-only
//! status transitions, `updated_at` bumped on mutation.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use roadpulse_core::incident::{IncidentStatus, NewIncident};
use roadpulse_core::types::Timestamp;

use crate::models::incident::IncidentRecord;
use crate::store::{IncidentFilter, IncidentStore, Page, StoreError};

#[derive(Debug, Default)]
pub struct MemoryIncidentStore {
    // Append-only except for status updates; creation order is newest-last.
    incidents: RwLock<Vec<IncidentRecord>>,
}

impl MemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time instead of now.
    ///
    /// For backfills and tests that need aged records; the normal write path
    /// always goes through [`IncidentStore::insert`].
    pub async fn insert_created_at(
        &self,
        incident: &NewIncident,
        created_at: Timestamp,
    ) -> IncidentRecord {
        let record = build_record(incident, created_at);
        let mut incidents = self.incidents.write().await;
        incidents.push(record.clone());
        incidents.sort_by_key(|r| r.created_at);
        record
    }
}

fn build_record(incident: &NewIncident, created_at: Timestamp) -> IncidentRecord {
    let telemetry = &incident.telemetry;
    IncidentRecord {
        id: Uuid::now_v7(),
        device_id: telemetry.device_id.clone(),
        timestamp: telemetry.timestamp,
        latitude: telemetry.location.latitude,
        longitude: telemetry.location.longitude,
        vibration_intensity: telemetry.vibration_intensity,
        channel: telemetry.channel,
        severity: incident.severity,
        priority: incident.priority,
        status: IncidentStatus::Reported,
        is_synthetic: incident.is_synthetic,
        auxiliary: telemetry.auxiliary.clone(),
        created_at,
        updated_at: created_at,
    }
}

fn matches(record: &IncidentRecord, filter: &IncidentFilter) -> bool {
    if let Some(device_id) = &filter.device_id {
        if &record.device_id != device_id {
            return false;
        }
    }
    if let Some(severity) = filter.severity {
        if record.severity != severity {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if record.status != status {
            return false;
        }
    }
    true
}

#[async_trait]
impl IncidentStore for MemoryIncidentStore {
    async fn insert(&self, incident: &NewIncident) -> Result<IncidentRecord, StoreError> {
        Ok(self.insert_created_at(incident, Utc::now()).await)
    }

    async fn list(
        &self,
        filter: &IncidentFilter,
        page: Page,
    ) -> Result<Vec<IncidentRecord>, StoreError> {
        let incidents = self.incidents.read().await;
        Ok(incidents
            .iter()
            .rev()
            .filter(|r| matches(r, filter))
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn latest(&self) -> Result<Option<IncidentRecord>, StoreError> {
        let incidents = self.incidents.read().await;
        Ok(incidents.last().cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
    ) -> Result<IncidentRecord, StoreError> {
        let mut incidents = self.incidents.write().await;
        let record = incidents
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if !record.status.can_advance_to(status) {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }

        record.status = status;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
