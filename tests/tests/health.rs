//! Tests for health check endpoints.
//!
//! The health registry and metrics are process-global, so the whole
//! lifecycle runs inside one test to keep the ordering deterministic.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

/// Test the health surface across the service lifecycle: probes flip the
/// store component, reference loading completes the set.
#[tokio::test]
async fn test_health_lifecycle() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // Liveness holds from the first request
    let response = server.get("/health/live").await;
    response.assert_status(StatusCode::OK);

    // Nothing has probed the store yet in this process
    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    // The full check probes the store and reports degraded until
    // reference data is loaded
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["store_reachable"], true);
    assert_eq!(body["schema_ready"], true);
    assert_eq!(body["status"], "degraded");

    let components = body["components"].as_array().expect("components list");
    let store = components
        .iter()
        .find(|c| c["name"] == "store")
        .expect("store component");
    assert_eq!(store["healthy"], true);
    let reference = components
        .iter()
        .find(|c| c["name"] == "reference_data")
        .expect("reference component");
    assert_eq!(reference["healthy"], false);

    // The probe flipped the store component, so the service is ready now
    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);

    // Loading reference data completes the component set
    let response = server.post("/admin/reference").await;
    response.assert_status_ok();

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["metrics"]["reference_countries"], 3);

    // The metrics snapshot carries the ingestion counters
    for field in [
        "events_received",
        "events_inserted",
        "events_skipped_duplicate",
        "recompute_runs",
    ] {
        assert!(
            body["metrics"][field].as_u64().is_some(),
            "metrics should carry a numeric '{}'",
            field
        );
    }
}
