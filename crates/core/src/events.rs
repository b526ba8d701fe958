//! Event envelope and typed payloads.
//!
//! Input arrives as line-delimited JSON. Each line carries the universal
//! envelope (`event_id`, `event_timestamp`, `event_type`, `event_data`); the
//! payload inside `event_data` is type-specific. Parsing goes through
//! `serde_json::Value` first so a malformed line (Decode) is reported
//! differently from a well-formed object with a missing or mistyped envelope
//! field (MissingField / InvalidDomainValue).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Envelope fields every input line must carry.
pub const ENVELOPE_FIELDS: [&str; 4] = ["event_id", "event_timestamp", "event_type", "event_data"];

/// The three event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Registration,
    SessionPing,
    Match,
}

impl EventType {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::SessionPing => "session_ping",
            Self::Match => "match",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registration" => Some(Self::Registration),
            "session_ping" => Some(Self::SessionPing),
            "match" => Some(Self::Match),
            _ => None,
        }
    }
}

/// Operating systems accepted on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOs {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Web,
}

impl DeviceOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::Web => "Web",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "iOS" => Some(Self::Ios),
            "Android" => Some(Self::Android),
            "Web" => Some(Self::Web),
            _ => None,
        }
    }
}

/// Universal event envelope: one line of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: i64,
    pub event_timestamp: i64,
    pub event_type: EventType,
    pub event_data: Value,
}

impl EventEnvelope {
    /// Parses one input line into an envelope.
    pub fn parse_line(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::decode(format!("error decoding JSON: {}", e)))?;

        let obj = value
            .as_object()
            .ok_or_else(|| Error::decode("event line is not a JSON object"))?;

        for field in ENVELOPE_FIELDS {
            if !obj.contains_key(field) {
                return Err(Error::missing_field(format!("required field: {}", field)));
            }
        }

        let event_id = obj["event_id"]
            .as_i64()
            .ok_or_else(|| Error::invalid_value("event_id must be an integer"))?;
        let event_timestamp = obj["event_timestamp"]
            .as_i64()
            .ok_or_else(|| Error::invalid_value("event_timestamp must be an integer"))?;
        let type_str = obj["event_type"]
            .as_str()
            .ok_or_else(|| Error::invalid_value("event_type must be a string"))?;
        let event_type = EventType::parse(type_str)
            .ok_or_else(|| Error::invalid_value(format!("invalid event_type: {}", type_str)))?;

        Ok(Self {
            event_id,
            event_timestamp,
            event_type,
            event_data: obj["event_data"].clone(),
        })
    }

    /// The `user_id` carried in event_data, if any.
    ///
    /// Every non-match event that names a user gets an insert-if-absent User
    /// row keyed on this value.
    pub fn user_id(&self) -> Option<&str> {
        self.event_data.get("user_id").and_then(Value::as_str)
    }

    /// Typed view of event_data. Call after validation has passed.
    pub fn payload(&self) -> Result<EventPayload> {
        let data = self.event_data.clone();
        let payload = match self.event_type {
            EventType::Registration => EventPayload::Registration(
                serde_json::from_value(data)
                    .map_err(|e| Error::decode(format!("registration event_data: {}", e)))?,
            ),
            EventType::SessionPing => EventPayload::SessionPing(
                serde_json::from_value(data)
                    .map_err(|e| Error::decode(format!("session_ping event_data: {}", e)))?,
            ),
            EventType::Match => EventPayload::Match(
                serde_json::from_value(data)
                    .map_err(|e| Error::decode(format!("match event_data: {}", e)))?,
            ),
        };
        Ok(payload)
    }
}

/// Registration extension data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationData {
    pub user_id: String,
    pub country: String,
    pub device_os: DeviceOs,
}

/// Session heartbeat extension data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPingData {
    pub user_id: String,
}

/// Match extension data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchData {
    #[serde(deserialize_with = "match_id_scalar")]
    pub match_id: String,
    pub home_user_id: String,
    pub away_user_id: String,
    #[serde(default)]
    pub home_goals_scored: i64,
    #[serde(default)]
    pub away_goals_scored: i64,
}

/// Typed event_data variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Registration(RegistrationData),
    SessionPing(SessionPingData),
    Match(MatchData),
}

/// Match ids appear as strings or bare numbers in the wire format; both are
/// stored as text.
fn match_id_scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "match_id must be a string or number, got {}",
            other
        ))),
    }
}
