use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub type EventTime = DateTime<Utc>;

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const OFFSET_DATE_TIME_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%d %H:%M%z"];
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a source timestamp into UTC.
///
/// Accepts RFC 3339 values, ISO-8601 date-times with or without an offset (`T` or space
/// separated, minute or second precision, optional fractional seconds, `+07:00` or `+0700`)
/// and bare dates. Naive values are taken as UTC.
/// Anything else yields `None` so the caller can drop the row instead of failing the batch.
pub fn parse_event_time(value: &str) -> Option<EventTime> {
    let value = value.trim();

    if value.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp.and_utc());
        }
    }

    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(value, format) {
            return Some(timestamp.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(value, NAIVE_DATE_FORMAT).ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|timestamp| timestamp.and_utc())
}
