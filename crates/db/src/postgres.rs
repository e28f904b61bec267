//! PostgreSQL-backed incident store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use roadpulse_core::incident::{IncidentStatus, NewIncident};

use crate::models::incident::IncidentRecord;
use crate::store::{IncidentFilter, IncidentStore, Page, StoreError};

/// Column list for `incidents` queries.
const INCIDENT_COLUMNS: &str = "id, device_id, timestamp, latitude, longitude, \
     vibration_intensity, channel, severity, priority, status, is_synthetic, \
     auxiliary, created_at, updated_at";

pub struct PgIncidentStore {
    pool: PgPool,
}

impl PgIncidentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentStore for PgIncidentStore {
    async fn insert(&self, incident: &NewIncident) -> Result<IncidentRecord, StoreError> {
        let telemetry = &incident.telemetry;
        let now = Utc::now();

        let query = format!(
            "INSERT INTO incidents ({INCIDENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {INCIDENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, IncidentRecord>(&query)
            .bind(Uuid::now_v7())
            .bind(&telemetry.device_id)
            .bind(telemetry.timestamp)
            .bind(telemetry.location.latitude)
            .bind(telemetry.location.longitude)
            .bind(telemetry.vibration_intensity)
            .bind(telemetry.channel.as_str())
            .bind(incident.severity.as_str())
            .bind(incident.priority.as_str())
            .bind(IncidentStatus::Reported.as_str())
            .bind(incident.is_synthetic)
            .bind(Json(&telemetry.auxiliary))
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list(
        &self,
        filter: &IncidentFilter,
        page: Page,
    ) -> Result<Vec<IncidentRecord>, StoreError> {
        let mut builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE TRUE"
        ));
        if let Some(device_id) = &filter.device_id {
            builder.push(" AND device_id = ").push_bind(device_id.as_str());
        }
        if let Some(severity) = filter.severity {
            builder.push(" AND severity = ").push_bind(severity.as_str());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let records = builder
            .build_query_as::<IncidentRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn latest(&self) -> Result<Option<IncidentRecord>, StoreError> {
        let query =
            format!("SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY created_at DESC LIMIT 1");
        let record = sqlx::query_as::<_, IncidentRecord>(&query)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
    ) -> Result<IncidentRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query =
            format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, IncidentRecord>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        if !current.status.can_advance_to(status) {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let query = format!(
            "UPDATE incidents SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {INCIDENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, IncidentRecord>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
