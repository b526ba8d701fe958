//! Country to timezone reference data.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One country to IANA timezone mapping row. Loaded once from reference
/// data; registration events are checked against the loaded countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneEntry {
    pub country: String,
    pub timezone: String,
}

impl TimezoneEntry {
    /// Parses one reference line. Unlike event lines, a malformed
    /// reference line is fatal to the load, so the error carries enough
    /// context to point at the line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::decode(format!("malformed reference line: {e}")))?;
        serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("malformed reference line: {e}")))
    }
}
