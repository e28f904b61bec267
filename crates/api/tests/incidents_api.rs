//! HTTP-level integration tests for the incident read entry, the lifecycle
//! mutation, connectivity reconciliation, and the synthetic generator.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{build_test_app, expect_json, get, patch_json, post_json};
use serde_json::json;

use roadpulse_core::incident::NewIncident;
use roadpulse_core::telemetry::{Auxiliary, TelemetryRecord};
use roadpulse_core::types::GeoPoint;

fn direct_body(device_id: &str, intensity: f64) -> serde_json::Value {
    json!({
        "deviceId": device_id,
        "location": { "latitude": 19.076, "longitude": 72.8777 },
        "vibrationIntensity": intensity,
    })
}

fn field_incident(device_id: &str, intensity: f64) -> NewIncident {
    let telemetry = TelemetryRecord::direct(
        device_id.to_string(),
        Utc::now(),
        GeoPoint {
            latitude: 19.076,
            longitude: 72.8777,
        },
        intensity,
        Auxiliary::default(),
    )
    .unwrap();
    NewIncident::from_telemetry(telemetry, false)
}

// ---------------------------------------------------------------------------
// Listing and filtering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_and_paginates() {
    let (app, _state, _store) = build_test_app();

    for (device, intensity) in [
        ("ESP32-BUS-001", 40.0),
        ("ESP32-BUS-002", 90.0),
        ("ESP32-BUS-001", 70.0),
    ] {
        let response = post_json(
            app.clone(),
            "/api/v1/ingest/telemetry",
            direct_body(device, intensity),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body = expect_json(get(app.clone(), "/api/v1/incidents").await, StatusCode::OK).await;
    assert_eq!(body["count"], 3);
    // Newest first.
    assert_eq!(body["data"][0]["severity"], "medium");

    let body = expect_json(
        get(app.clone(), "/api/v1/incidents?severity=high").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["deviceId"], "ESP32-BUS-002");

    let body = expect_json(
        get(app.clone(), "/api/v1/incidents?deviceId=ESP32-BUS-001").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["count"], 2);

    let body = expect_json(
        get(app.clone(), "/api/v1/incidents?limit=2").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["count"], 2);

    let response = get(app, "/api/v1/incidents?severity=catastrophic").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Lifecycle status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_advances_forward_only() {
    let (app, _state, _store) = build_test_app();

    let response = post_json(
        app.clone(),
        "/api/v1/ingest/telemetry",
        direct_body("ESP32-BUS-001", 90.0),
    )
    .await;
    let body = expect_json(response, StatusCode::CREATED).await;
    let id = body["incidentId"].as_str().unwrap().to_string();

    let body = expect_json(
        patch_json(
            app.clone(),
            &format!("/api/v1/incidents/{id}/status"),
            json!({ "status": "verified" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["status"], "verified");
    assert!(body["data"]["updatedAt"].is_string());

    // Backward moves conflict.
    let body = expect_json(
        patch_json(
            app.clone(),
            &format!("/api/v1/incidents/{id}/status"),
            json!({ "status": "reported" }),
        )
        .await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(body["code"], "CONFLICT");

    // Unknown status values are rejected before touching the store.
    let response = patch_json(
        app.clone(),
        &format!("/api/v1/incidents/{id}/status"),
        json!({ "status": "repaired" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown ids are a 404.
    let response = patch_json(
        app,
        "/api/v1/incidents/00000000-0000-7000-8000-000000000000/status",
        json!({ "status": "verified" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Connectivity reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connectivity_with_no_evidence_is_disconnected() {
    let (app, _state, _store) = build_test_app();

    let body = expect_json(get(app, "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], false);
    assert_eq!(body["source"], "none");
}

#[tokio::test]
async fn connectivity_prefers_the_tracker() {
    let (app, _state, _store) = build_test_app();

    let response = post_json(
        app.clone(),
        "/api/v1/ingest/telemetry",
        direct_body("ESP32-BUS-001", 40.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = expect_json(get(app.clone(), "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], true);
    assert_eq!(body["source"], "tracker");

    // All devices forced offline: authoritative disconnect, even though a
    // fresh incident exists in the store.
    let response = post_json(
        app.clone(),
        "/api/v1/devices/status",
        json!({ "deviceId": "ESP32-BUS-001", "action": "offline" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = expect_json(get(app, "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], false);
    assert_eq!(body["source"], "tracker");
}

/// A device with no heartbeats whose only incident is older than the recency
/// window reads as disconnected.
#[tokio::test]
async fn connectivity_fallback_rejects_stale_incidents() {
    let (app, _state, store) = build_test_app();

    store
        .insert_created_at(
            &field_incident("ESP32-BUS-001", 70.0),
            Utc::now() - Duration::minutes(11),
        )
        .await;

    let body = expect_json(get(app, "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], false);
    assert_eq!(body["source"], "incidents");
}

#[tokio::test]
async fn connectivity_fallback_accepts_fresh_incidents() {
    let (app, _state, store) = build_test_app();

    store
        .insert_created_at(
            &field_incident("ESP32-BUS-001", 70.0),
            Utc::now() - Duration::minutes(5),
        )
        .await;

    let body = expect_json(get(app, "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], true);
    assert_eq!(body["source"], "incidents");
}

// ---------------------------------------------------------------------------
// Synthetic traffic
// ---------------------------------------------------------------------------

/// Synthetic records are stored and listed but never make the system look
/// connected: they skip the tracker and are excluded from the fallback.
#[tokio::test]
async fn synthetic_records_never_fake_connectivity() {
    let (app, state, _store) = build_test_app();

    let body = expect_json(
        post_json(app.clone(), "/api/v1/simulate", json!({})).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["incident"]["isSynthetic"], true);
    assert_eq!(body["incident"]["deviceId"], "ESP32-BUS-TEST");

    // Stored and visible in the list...
    let body = expect_json(get(app.clone(), "/api/v1/incidents").await, StatusCode::OK).await;
    assert_eq!(body["count"], 1);

    // ...but the tracker never heard of the test device...
    assert!(state.tracker.get("ESP32-BUS-TEST").await.is_none());

    // ...and the verdict stays disconnected.
    let body = expect_json(get(app, "/api/v1/connectivity").await, StatusCode::OK).await;
    assert_eq!(body["connected"], false);
}
