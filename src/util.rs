use std::error::Error;

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a reference time given as unix seconds, `YYYY-MM-DD` (midnight
/// UTC) or an RFC 3339 timestamp, returning unix seconds.
pub fn parse_as_of(s: &str) -> Result<i64, Box<dyn Error>> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid date: {s}"))?;
        return Ok(midnight.and_utc().timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).timestamp());
    }
    Err(format!("invalid time '{s}': expected YYYY-MM-DD, RFC 3339 or unix seconds").into())
}

/// Current wall-clock time in unix seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Trim, lowercase and drop empty entries from a list of identities.
pub fn normalize_identities<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "util_test.rs"]
mod tests;
