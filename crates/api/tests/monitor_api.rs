//! Integration tests for the monitoring endpoints and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;

const BUSY_HOST: Option<(f64, f64, f64, f64)> = Some((92.0, 40.0, 30.0, 45.0));
const QUIET_HOST: Option<(f64, f64, f64, f64)> = Some((10.0, 20.0, 30.0, 40.0));

// ---------------------------------------------------------------------------
// Health and middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = build_test_app(QUIET_HOST);
    let response = get(app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
    assert_eq!(json["providers"]["sms"], json!(["twilio"]));
    assert!(json["providers"]["push"].is_null());
    assert_eq!(json["monitor_enabled"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(QUIET_HOST);
    let response = get(app.router, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No route for /this-route-does-not-exist");
}

#[tokio::test]
async fn unknown_api_route_uses_the_error_envelope() {
    let app = build_test_app(QUIET_HOST);
    let response = get(app.router, "/api/v1/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = build_test_app(QUIET_HOST);
    let padding = "x".repeat(hostwatch_api::router::MAX_BODY_BYTES + 1);
    let response = post_json(
        app.router,
        "/api/v1/messages/status",
        json!({ "message": padding }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = build_test_app(QUIET_HOST);
    let response = get(app.router, "/api/v1/dashboard/status").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_status_returns_live_snapshot() {
    let app = build_test_app(BUSY_HOST);
    let response = get(app.router, "/api/v1/dashboard/status?server_id=web-1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["snapshot"]["server_id"], "web-1");
    assert_eq!(json["data"]["snapshot"]["cpu_pct"], 92.0);
    assert_eq!(json["data"]["thresholds"]["cpu_max"], 80.0);
}

#[tokio::test]
async fn dashboard_status_maps_sampling_failure_to_503() {
    let app = build_test_app(None);
    let response = get(app.router, "/api/v1/dashboard/status").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SAMPLING_FAILED");
}

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cycle_with_override_delivers_by_sms() {
    let app = build_test_app(BUSY_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({
            "server_id": "web-1",
            "recipient": { "name": "Asha", "phone": "9985252395" }
        }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["state"], "complete");
    assert_eq!(data["alerts"][0]["metric"], "cpu");
    assert_eq!(data["alerts"][0]["message"], "High CPU usage: 92%");
    assert_eq!(data["alerts"][0]["delivered"], true);
    assert_eq!(data["outcome"]["delivered_via_sms"], true);
    assert_eq!(data["outcome"]["sms_provider"], "twilio");
    assert_eq!(app.sms_calls(), 1);
    assert_eq!(app.store.alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn quiet_host_reports_no_alert() {
    let app = build_test_app(QUIET_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({ "recipient": { "phone": "+15550001111" } }),
        None,
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "no_alert");
    assert_eq!(app.sms_calls(), 0);
}

#[tokio::test]
async fn request_thresholds_override_defaults() {
    let app = build_test_app(QUIET_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({
            "thresholds": { "cpu_max": 5 },
            "recipient": { "phone": "+15550001111" }
        }),
        None,
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "complete");
    assert_eq!(json["data"]["alerts"][0]["threshold"], 5.0);
}

#[tokio::test]
async fn forced_cycle_sends_test_alert() {
    let app = build_test_app(QUIET_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({ "forced": true, "recipient": { "phone": "+15550001111" } }),
        None,
    )
    .await;

    let json = body_json(response).await;
    let alerts = json["data"]["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["metric"], "test");
    assert_eq!(app.sms_calls(), 1);
}

#[tokio::test]
async fn cycle_without_recipient_is_unreachable() {
    let app = build_test_app(BUSY_HOST);
    let response = post_json(app.router.clone(), "/api/v1/monitor/cycles", json!({}), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "unreachable");
    assert_eq!(json["data"]["alerts"][0]["delivered"], false);
    assert!(json["data"]["outcome"].is_null());
    assert_eq!(app.sms_calls(), 0);
}

#[tokio::test]
async fn bearer_session_resolves_recipient() {
    let app = build_test_app(BUSY_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({}),
        Some("valid-session"),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "complete");
    assert_eq!(app.sms_calls(), 1);
}

#[tokio::test]
async fn unknown_session_is_unreachable() {
    let app = build_test_app(BUSY_HOST);
    let response = post_json(
        app.router.clone(),
        "/api/v1/monitor/cycles",
        json!({}),
        Some("someone-else"),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "unreachable");
    assert_eq!(app.sms_calls(), 0);
}

#[tokio::test]
async fn cycle_sampling_failure_is_503() {
    let app = build_test_app(None);
    let response = post_json(app.router, "/api/v1/monitor/cycles", json!({}), None).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SAMPLING_FAILED");
}

#[tokio::test]
async fn blank_server_id_is_400() {
    let app = build_test_app(BUSY_HOST);
    let response = post_json(
        app.router,
        "/api/v1/monitor/cycles",
        json!({ "server_id": "   " }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// History validation (rejected before any query runs)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metrics_history_rejects_out_of_range_hours() {
    let app = build_test_app(QUIET_HOST);

    let response = get(app.router.clone(), "/api/v1/metrics/web-1?hours=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app.router, "/api/v1/metrics/web-1?hours=169").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn notification_history_rejects_unknown_channel() {
    let app = build_test_app(QUIET_HOST);
    let response = get(app.router, "/api/v1/notifications?channel=fax").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
