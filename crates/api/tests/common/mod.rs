//! Shared helpers for HTTP-level integration tests.
//!
//! Tests drive the full router through `tower::ServiceExt::oneshot` against
//! the in-memory incident store, so no database is required.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use roadpulse_api::config::ServerConfig;
use roadpulse_api::events::IncidentFeed;
use roadpulse_api::routes;
use roadpulse_api::state::AppState;
use roadpulse_core::incident::{IncidentStatus, NewIncident};
use roadpulse_core::liveness::LivenessTracker;
use roadpulse_db::memory::MemoryIncidentStore;
use roadpulse_db::models::incident::IncidentRecord;
use roadpulse_db::store::{IncidentFilter, IncidentStore, Page, StoreError};

/// Build the app router plus handles to its state and the concrete store.
pub fn build_test_app() -> (Router, AppState, Arc<MemoryIncidentStore>) {
    let store = Arc::new(MemoryIncidentStore::new());
    let state = AppState {
        store: Arc::clone(&store) as Arc<dyn IncidentStore>,
        tracker: Arc::new(LivenessTracker::new()),
        feed: IncidentFeed::new(),
        config: Arc::new(ServerConfig::from_env()),
    };

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state.clone());

    (app, state, store)
}

/// An incident store whose every operation fails, for degraded-path tests.
pub struct FailingStore;

#[async_trait]
impl IncidentStore for FailingStore {
    async fn insert(&self, _incident: &NewIncident) -> Result<IncidentRecord, StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn list(
        &self,
        _filter: &IncidentFilter,
        _page: Page,
    ) -> Result<Vec<IncidentRecord>, StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn latest(&self) -> Result<Option<IncidentRecord>, StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn update_status(
        &self,
        _id: Uuid,
        _status: IncidentStatus,
    ) -> Result<IncidentRecord, StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }
}

/// Build the app router on top of [`FailingStore`].
pub fn build_failing_app() -> (Router, AppState) {
    let state = AppState {
        store: Arc::new(FailingStore),
        tracker: Arc::new(LivenessTracker::new()),
        feed: IncidentFeed::new(),
        config: Arc::new(ServerConfig::from_env()),
    };

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state.clone());

    (app, state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_form(app: Router, uri: &str, form: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Percent-encode a relay payload into a `Body=` form field.
pub fn relay_form(payload: &str) -> String {
    let encoded: String = payload
        .chars()
        .map(|c| match c {
            '%' => "%25".to_string(),
            '|' => "%7C".to_string(),
            ':' => "%3A".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ' ' => "+".to_string(),
            other => other.to_string(),
        })
        .collect();
    format!("Body={encoded}")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response status and return the parsed JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
