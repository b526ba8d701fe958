//! End-to-end tests for the reload surface.
//!
//! /initialize composes the four steps; the /admin routes expose them
//! individually. Both paths are checked against the store contents.

use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use matchday_core::EventType;
use sqlite_store::query;

/// Test the four-step reload end to end: reset, reference, ingest, recompute.
#[tokio::test]
async fn test_initialize_full_flow() {
    let ctx = TestContext::with_files(&fixtures::small_world(), &fixtures::default_timezones());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/initialize").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["reference_countries"], 3);
    assert_eq!(body["ingest"]["received"], 8);
    assert_eq!(body["ingest"]["inserted"], 8);
    assert_eq!(body["recompute"]["users"], 2);
    assert_eq!(body["recompute"]["rows_updated"], 4);
    assert_eq!(body["recompute"]["cancelled"], false);

    // The store now holds the fixture world
    assert_eq!(query::count_events(&ctx.store).unwrap(), 8);
    assert_eq!(
        query::count_events_by_type(&ctx.store, EventType::SessionPing).unwrap(),
        4
    );
    assert_eq!(query::count_match_rows(&ctx.store).unwrap(), 2);
    assert_eq!(
        query::all_user_ids(&ctx.store).unwrap(),
        vec!["u1".to_string(), "u2".to_string()]
    );

    let ids: Vec<i64> = query::session_rows_for_user(&ctx.store, "u1")
        .unwrap()
        .into_iter()
        .map(|row| row.session_id)
        .collect();
    assert_eq!(ids, vec![1, 1, 2], "u1's 70s gap opens a second session");
}

/// Test that re-initializing resets first, so nothing reports as duplicate.
#[tokio::test]
async fn test_initialize_is_repeatable() {
    let ctx = TestContext::with_files(&fixtures::small_world(), &fixtures::default_timezones());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/initialize").await.assert_status_ok();

    let response = server.get("/initialize").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["ingest"]["inserted"], 8, "reset wipes the previous load");
    assert_eq!(body["ingest"]["skipped_duplicate"], 0);
    assert_eq!(query::count_events(&ctx.store).unwrap(), 8);
}

/// Test that the four admin steps compose to the same state as /initialize.
#[tokio::test]
async fn test_admin_steps_compose() {
    let ctx = TestContext::with_files(&fixtures::small_world(), &fixtures::default_timezones());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/admin/reset").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "reset");

    let response = server.post("/admin/reference").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["countries"], 3);

    let response = server.post("/admin/ingest").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["inserted"], 8);

    let response = server.post("/admin/recompute").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["users"], 2);
    assert_eq!(body["rows_updated"], 4);

    assert_eq!(query::count_events(&ctx.store).unwrap(), 8);
}

/// Test that reset drops prior state entirely.
#[tokio::test]
async fn test_reset_clears_the_store() {
    let ctx = TestContext::with_files(&fixtures::small_world(), &fixtures::default_timezones());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/initialize").await.assert_status_ok();
    assert_eq!(query::count_events(&ctx.store).unwrap(), 8);

    server.post("/admin/reset").await.assert_status_ok();
    assert_eq!(query::count_events(&ctx.store).unwrap(), 0);
    assert_eq!(query::all_user_ids(&ctx.store).unwrap(), Vec::<String>::new());
}
