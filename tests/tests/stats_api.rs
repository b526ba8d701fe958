//! Tests for the user and game stats endpoints.
//!
//! Fixture world: u1 (Germany) pings at [0, 30, 100, 90000] forming three
//! sessions and wins match m1 at home twice 2:1 against u2 (Japan), who
//! pings once. Events span two UTC days.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn stats_world() -> Vec<String> {
    let mut lines = fixtures::small_world();
    lines.push(fixtures::session_ping(40, 90_000, "u1"));
    lines
}

async fn initialized_context() -> (TestContext, TestServer) {
    let ctx = TestContext::with_files(&stats_world(), &fixtures::default_timezones());
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    server.get("/initialize").await.assert_status_ok();
    (ctx, server)
}

/// Test the full user stats reply for a user with sessions and matches.
#[tokio::test]
async fn test_user_stats_reply() {
    let (_ctx, server) = initialized_context().await;

    let response = server.get("/user_stats").add_query_param("user_id", "u1").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["country_info"]["country"], "Germany");
    assert_eq!(body["country_info"]["timezone"], "Europe/Berlin");
    assert_eq!(
        body["country_info"]["registered_at_local"], "1970-01-01 01:00:00",
        "epoch registration renders in Berlin local time"
    );
    assert_eq!(body["number_of_sessions"], 3);
    assert_eq!(
        body["time_spent_in_game_seconds"], 60,
        "(4 pings - 3 sessions) * 60"
    );
    assert_eq!(body["total_points_home"], 6, "two home wins pay 3 each");
    assert_eq!(body["total_points_away"], 0);
    assert_eq!(
        body["match_time_percentage"], 100.0,
        "m1 spans 60s against 60s in game"
    );

    let days = body["days_since_last_login"].as_i64().expect("whole days");
    assert!(
        (20_000..30_000).contains(&days),
        "epoch registration is tens of thousands of days ago, got {}",
        days
    );
}

/// Test that the date filter restricts sessions, pings and matches to
/// one UTC day.
#[tokio::test]
async fn test_user_stats_date_filter() {
    let (_ctx, server) = initialized_context().await;

    let response = server
        .get("/user_stats")
        .add_query_param("user_id", "u1")
        .add_query_param("date", "1970-01-01")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["number_of_sessions"], 2, "day one holds two sessions");
    assert_eq!(body["time_spent_in_game_seconds"], 60);
    assert_eq!(body["total_points_home"], 6);

    let response = server
        .get("/user_stats")
        .add_query_param("user_id", "u1")
        .add_query_param("date", "1970-01-02")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["number_of_sessions"], 1, "only the late ping is on day two");
    assert_eq!(body["time_spent_in_game_seconds"], 0);
    assert_eq!(body["total_points_home"], 0);
    assert_eq!(body["match_time_percentage"], 0.0);
}

/// Test that an unknown user is a 404 with the not_found code.
#[tokio::test]
async fn test_user_stats_unknown_user_returns_404() {
    let (_ctx, server) = initialized_context().await;

    let response = server
        .get("/user_stats")
        .add_query_param("user_id", "ghost")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "not_found");
}

/// Test that an empty or missing user_id is rejected before touching the store.
#[tokio::test]
async fn test_user_stats_rejects_bad_user_id_param() {
    let (_ctx, server) = initialized_context().await;

    let response = server.get("/user_stats").add_query_param("user_id", "").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "validation_failed");

    let response = server.get("/user_stats").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

/// Test that a malformed date is a 400 with the invalid_value code.
#[tokio::test]
async fn test_user_stats_rejects_malformed_date() {
    let (_ctx, server) = initialized_context().await;

    let response = server
        .get("/user_stats")
        .add_query_param("user_id", "u1")
        .add_query_param("date", "22-11-2016")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "invalid_value");
}

/// Test the game-wide reply over the whole history.
#[tokio::test]
async fn test_game_stats_reply() {
    let (_ctx, server) = initialized_context().await;

    let response = server.get("/game_stats").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["active_users"], 2);
    assert_eq!(body["total_sessions"], 4);
    assert_eq!(body["average_sessions_per_user"], 2.0);
    assert_eq!(
        body["users_with_most_points"],
        serde_json::json!(["u1"]),
        "u1 holds 6 points, u2 none"
    );
    assert_eq!(body["most_points"], 6);
}

/// Test the game-wide reply restricted to each day.
#[tokio::test]
async fn test_game_stats_date_filter() {
    let (_ctx, server) = initialized_context().await;

    let response = server.get("/game_stats").add_query_param("date", "1970-01-01").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["active_users"], 2);
    assert_eq!(body["total_sessions"], 3);
    assert_eq!(body["average_sessions_per_user"], 1.5);
    assert_eq!(body["most_points"], 6);

    let response = server.get("/game_stats").add_query_param("date", "1970-01-02").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["active_users"], 1);
    assert_eq!(body["total_sessions"], 1);
    assert_eq!(body["average_sessions_per_user"], 1.0);
    assert_eq!(
        body["users_with_most_points"],
        serde_json::json!(["u1", "u2"]),
        "no matches on day two, so every user ties at zero"
    );
    assert_eq!(body["most_points"], 0);
}
