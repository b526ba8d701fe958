//! Test fixtures and event-line builders.

use serde_json::json;

/// A registration line with the default iOS device.
pub fn registration(event_id: i64, ts: i64, user_id: &str, country: &str) -> String {
    registration_with_os(event_id, ts, user_id, country, "iOS")
}

/// A registration line with an explicit device_os value.
pub fn registration_with_os(
    event_id: i64,
    ts: i64,
    user_id: &str,
    country: &str,
    device_os: &str,
) -> String {
    json!({
        "event_id": event_id,
        "event_timestamp": ts,
        "event_type": "registration",
        "event_data": {
            "user_id": user_id,
            "country": country,
            "device_os": device_os
        }
    })
    .to_string()
}

/// A session heartbeat line.
pub fn session_ping(event_id: i64, ts: i64, user_id: &str) -> String {
    json!({
        "event_id": event_id,
        "event_timestamp": ts,
        "event_type": "session_ping",
        "event_data": { "user_id": user_id }
    })
    .to_string()
}

/// Consecutive heartbeat lines for one user, event ids starting at `first_event_id`.
pub fn ping_series(first_event_id: i64, user_id: &str, timestamps: &[i64]) -> Vec<String> {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, ts)| session_ping(first_event_id + i as i64, *ts, user_id))
        .collect()
}

/// A match line between two users.
pub fn match_event(
    event_id: i64,
    ts: i64,
    match_id: &str,
    home_user_id: &str,
    away_user_id: &str,
    home_goals: i64,
    away_goals: i64,
) -> String {
    json!({
        "event_id": event_id,
        "event_timestamp": ts,
        "event_type": "match",
        "event_data": {
            "match_id": match_id,
            "home_user_id": home_user_id,
            "away_user_id": away_user_id,
            "home_goals_scored": home_goals,
            "away_goals_scored": away_goals
        }
    })
    .to_string()
}

/// A timezone reference line.
pub fn timezone(country: &str, tz: &str) -> String {
    json!({ "country": country, "timezone": tz }).to_string()
}

/// Reference set used by most tests.
pub fn default_timezones() -> Vec<String> {
    vec![
        timezone("Germany", "Europe/Berlin"),
        timezone("Japan", "Asia/Tokyo"),
        timezone("Norway", "Europe/Oslo"),
    ]
}

/// Two registered users with heartbeats and one played match.
///
/// u1 (Germany) pings at [0, 30, 100] forming two sessions; u2 (Japan)
/// pings at [10] forming one. The match m1 spans ts 40..100 and u1 wins
/// at home 2:1.
pub fn small_world() -> Vec<String> {
    let mut lines = vec![
        registration(1, 0, "u1", "Germany"),
        registration(2, 0, "u2", "Japan"),
    ];
    lines.extend(ping_series(10, "u1", &[0, 30, 100]));
    lines.push(session_ping(20, 10, "u2"));
    lines.push(match_event(30, 40, "m1", "u1", "u2", 2, 1));
    lines.push(match_event(31, 100, "m1", "u1", "u2", 2, 1));
    lines
}
