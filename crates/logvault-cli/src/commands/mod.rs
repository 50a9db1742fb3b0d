pub mod count;
pub mod query;
pub mod status;
pub mod write;

use anyhow::{anyhow, Result};
use logvault::prelude::*;

/// Parse a timestamp given on the command line.
///
/// Accepts the on-disk layout (`2024-01-01T00:00:00Z`), any RFC 3339
/// timestamp, or a bare date (midnight UTC).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = logvault::codec::parse_date(text) {
        return Ok(at);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(anyhow!(
        "invalid timestamp '{}': expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SSZ or RFC 3339",
        text
    ))
}

/// One record as a single human-readable line.
pub fn render(record: &Record) -> String {
    format!(
        "{} {:<7} #{:<6} {} | {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.level,
        record.id,
        record.location,
        record.message.replace('\n', "\\n")
    )
}
