//! Timestamp parsing for spend times and range filters
//!
//! Accepted forms, tried in order:
//! - RFC 3339 (`2024-01-15T09:30:00+02:00`, `2024-01-15T07:30:00Z`)
//! - naive date-time, read as UTC (`2024-01-15T07:30:00`, `2024-01-15 07:30:00.250`)
//! - plain date (`2024-01-15`), resolved per [`BoundKind`]

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::ValidationError;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which instant of the day a plain date stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Midnight at the start of the day
    Start,
    /// Last representable microsecond of the day
    End,
}

/// Parse a timestamp, mapping failures to a validation error on `field`.
pub fn parse_timestamp(
    field: &'static str,
    raw: &str,
    bound: BoundKind,
) -> Result<DateTime<Utc>, ValidationError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    let invalid = ValidationError::InvalidFormat {
        field,
        reason: "expected an RFC 3339 timestamp or a YYYY-MM-DD date",
    };

    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid.clone())?;
    let naive = match bound {
        BoundKind::Start => Some(date.and_time(NaiveTime::MIN)),
        BoundKind::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
    };

    naive.map(|n| n.and_utc()).ok_or(invalid)
}
