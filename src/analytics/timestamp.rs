use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::records::TelemetryRecord;

/// Why a capture instant could not be used for time accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("capture time missing")]
    Missing,
    #[error("invalid capture time '{0}'")]
    Invalid(String),
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 capture instant. Values without an offset are taken as UTC.
pub fn parse_capture_time(raw: Option<&str>) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(TimestampError::Missing)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::Invalid(raw.to_string()))
}

/// Seconds elapsed from `prev` to `curr`; negative when the pair is out of order.
pub fn elapsed_seconds(
    prev: &TelemetryRecord,
    curr: &TelemetryRecord,
) -> Result<f64, TimestampError> {
    let start = parse_capture_time(prev.datetime_iso.as_deref())?;
    let end = parse_capture_time(curr.datetime_iso.as_deref())?;
    let delta = end - start;
    Ok(delta.num_microseconds().unwrap_or(delta.num_milliseconds() * 1000) as f64 / 1e6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(raw: &str) -> TelemetryRecord {
        TelemetryRecord {
            datetime_iso: Some(raw.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parses_utc_designator_and_offsets() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_capture_time(Some("2024-01-01T12:00:00Z")), Ok(expected));
        assert_eq!(
            parse_capture_time(Some("2024-01-01T14:00:00+02:00")),
            Ok(expected)
        );
        assert_eq!(
            parse_capture_time(Some("2024-01-01T14:00:00+0200")),
            Ok(expected)
        );
    }

    #[test]
    fn test_naive_values_are_utc() {
        let parsed = parse_capture_time(Some("2024-01-01T12:00:00.250000")).unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 250);
        assert_eq!(
            parse_capture_time(Some("2024-01-01")),
            Ok(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_and_garbage_are_distinguished() {
        assert_eq!(parse_capture_time(None), Err(TimestampError::Missing));
        assert_eq!(parse_capture_time(Some("  ")), Err(TimestampError::Missing));
        assert_eq!(
            parse_capture_time(Some("yesterday")),
            Err(TimestampError::Invalid("yesterday".into()))
        );
    }

    #[test]
    fn test_elapsed_between_records() {
        let secs = elapsed_seconds(&at("2024-01-01T12:00:00"), &at("2024-01-01T12:01:40.5")).unwrap();
        assert_eq!(secs, 100.5);

        let backwards = elapsed_seconds(&at("2024-01-01T12:01:00Z"), &at("2024-01-01T12:00:00Z"));
        assert_eq!(backwards, Ok(-60.0));

        assert!(elapsed_seconds(&at("bad"), &at("2024-01-01T12:00:00Z")).is_err());
    }
}
