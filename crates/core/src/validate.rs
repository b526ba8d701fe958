//! Per-type validation of event_data.
//!
//! One stateless validate function per event type behind a single dispatch
//! point. Failures are per-event: the caller records them and moves on.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::events::{DeviceOs, EventType};

/// Validates event_data against the rules for its event type.
pub fn validate_event_data(event_type: EventType, data: &Value) -> Result<()> {
    match event_type {
        EventType::Registration => validate_registration(data),
        EventType::SessionPing => validate_session_ping(data),
        EventType::Match => validate_match(data),
    }
}

fn validate_registration(data: &Value) -> Result<()> {
    require_fields(data, &["country", "user_id", "device_os"], "registration")?;
    require_string(data, "user_id", "registration")?;
    require_string(data, "country", "registration")?;

    let os = data["device_os"].as_str().and_then(DeviceOs::parse);
    if os.is_none() {
        return Err(Error::invalid_value(format!(
            "invalid device_os: {}",
            data["device_os"]
        )));
    }
    Ok(())
}

fn validate_session_ping(data: &Value) -> Result<()> {
    require_fields(data, &["user_id"], "session_ping")?;
    require_string(data, "user_id", "session_ping")
}

fn validate_match(data: &Value) -> Result<()> {
    require_fields(data, &["match_id", "home_user_id", "away_user_id"], "match")?;
    require_string(data, "home_user_id", "match")?;
    require_string(data, "away_user_id", "match")?;
    require_goals(data, "home_goals_scored")?;
    require_goals(data, "away_goals_scored")
}

fn require_fields(data: &Value, fields: &[&str], event_type: &str) -> Result<()> {
    let obj = data.as_object().ok_or_else(|| {
        Error::invalid_value(format!("event_data for {} must be an object", event_type))
    })?;
    for field in fields {
        if !obj.contains_key(*field) {
            return Err(Error::missing_field(format!(
                "{} in event_data for {}",
                field, event_type
            )));
        }
    }
    Ok(())
}

fn require_string(data: &Value, field: &str, event_type: &str) -> Result<()> {
    if data[field].as_str().is_none() {
        return Err(Error::invalid_value(format!(
            "{} must be a string in event_data for {}",
            field, event_type
        )));
    }
    Ok(())
}

/// Goal counts are optional, but when present they must be non-negative
/// integers. `as_u64` rejects floats and negatives in one check.
fn require_goals(data: &Value, field: &str) -> Result<()> {
    match data.get(field) {
        None => Ok(()),
        Some(v) if v.as_u64().is_some() => Ok(()),
        Some(_) => Err(Error::invalid_value(format!(
            "{} must be a non-negative integer",
            field
        ))),
    }
}
