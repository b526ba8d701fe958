//! Date filter parsing.

use chrono::{NaiveDate, NaiveTime};
use matchday_core::{Error, Result};
use sqlite_store::TimeRange;

/// Parses a `YYYY-MM-DD` filter into the UTC day `[00:00, 24:00)` as a
/// half-open timestamp range.
pub fn day_range(date: &str) -> Result<TimeRange> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::invalid_value(format!("invalid date '{date}', expected YYYY-MM-DD")))?;
    let start = day.and_time(NaiveTime::MIN).and_utc().timestamp();
    Ok(TimeRange {
        start,
        end: start + 86_400,
    })
}
