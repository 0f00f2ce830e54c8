//! # Temporal Coercion — Dates at Millisecond Precision
//!
//! Parsing and rendering for `Date`-typed fields. Every date produced by
//! this module is UTC and truncated to millisecond precision, the
//! resolution of epoch-millisecond inputs.
//!
//! ## Accepted Inputs
//!
//! - RFC 3339 timestamps with any offset, normalized to UTC.
//! - `YYYY`, `YYYY-MM`, and `YYYY-MM-DD`, read as UTC midnight.
//! - `YYYY-MM-DDTHH:MM[:SS[.fff]]` without an offset, read as UTC. A
//!   space may stand in for the `T`.
//! - Finite epoch-millisecond numbers within ±8.64e15.
//!
//! Anything else is not a date; callers decide how to report it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

/// Largest magnitude of an epoch-millisecond value that is a valid date.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Offset-less date-time layouts, tried in order.
const NAIVE_LAYOUTS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a textual date.
///
/// Returns `None` when the text is not one of the accepted layouts or
/// names a non-existent calendar date.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(truncate_to_millis(dt.with_timezone(&Utc)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return midnight(date);
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(truncate_to_millis(Utc.from_utc_datetime(&naive)));
        }
    }

    parse_partial_date(s)
}

/// Build a date from epoch milliseconds; fractional milliseconds are
/// truncated toward zero.
pub fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    let millis = millis.trunc() as i64;
    let secs = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Epoch milliseconds of a date.
pub fn epoch_millis(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64
}

/// Render as ISO 8601 with milliseconds and `Z` suffix
/// (e.g., `2023-01-01T00:00:00.000Z`).
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `YYYY` and `YYYY-MM`.
fn parse_partial_date(s: &str) -> Option<DateTime<Utc>> {
    let (year, month) = match s.split_once('-') {
        Some((year, month)) => (year, Some(month)),
        None => (s, None),
    };
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = match month {
        Some(m) if m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()) => m.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    midnight(NaiveDate::from_ymd_opt(year, month, 1)?)
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Truncate a `DateTime<Utc>` to millisecond precision.
fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.nanosecond();
    dt.with_nanosecond(nanos - nanos % 1_000_000).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    // ---- parse_date ----

    #[test]
    fn test_parse_date_only_is_utc_midnight() {
        assert_eq!(parse_date("2023-01-01"), Some(utc(2023, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rfc3339_z() {
        assert_eq!(
            parse_date("2023-01-01T10:30:00Z"),
            Some(utc(2023, 1, 1, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_rfc3339_offset_normalized() {
        assert_eq!(
            parse_date("2023-01-01T15:30:00+05:00"),
            Some(utc(2023, 1, 1, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_naive_datetime_read_as_utc() {
        assert_eq!(
            parse_date("2023-06-15T08:00"),
            Some(utc(2023, 6, 15, 8, 0, 0))
        );
        assert_eq!(
            parse_date("2023-06-15T08:00:05"),
            Some(utc(2023, 6, 15, 8, 0, 5))
        );
    }

    #[test]
    fn test_parse_space_separated_naive_datetime() {
        assert_eq!(
            parse_date("2023-01-01 10:30"),
            Some(utc(2023, 1, 1, 10, 30, 0))
        );
        assert_eq!(
            parse_date("2023-01-01 10:30:15"),
            Some(utc(2023, 1, 1, 10, 30, 15))
        );
        assert_eq!(
            parse_date("2023-01-01 10:30:15.250").map(|dt| epoch_millis(&dt)),
            Some(1_672_569_015_250.0)
        );
    }

    #[test]
    fn test_parse_truncates_to_millis() {
        let dt = parse_date("2023-01-01T00:00:00.123456789Z").unwrap();
        assert_eq!(dt.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_parse_partial_dates() {
        assert_eq!(parse_date("2023"), Some(utc(2023, 1, 1, 0, 0, 0)));
        assert_eq!(parse_date("2023-07"), Some(utc(2023, 7, 1, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date("invalid date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-13-01"), None);
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date("1672531200000"), None);
    }

    // ---- epoch millis ----

    #[test]
    fn test_from_epoch_millis() {
        assert_eq!(
            from_epoch_millis(1_672_531_200_000.0),
            Some(utc(2023, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_from_epoch_millis_negative_and_fractional() {
        let dt = from_epoch_millis(-1.5).unwrap();
        assert_eq!(epoch_millis(&dt), -1.0);
    }

    #[test]
    fn test_from_epoch_millis_rejects_out_of_range() {
        assert_eq!(from_epoch_millis(f64::NAN), None);
        assert_eq!(from_epoch_millis(f64::INFINITY), None);
        assert_eq!(from_epoch_millis(8.64e15 + 1.0), None);
    }

    #[test]
    fn test_iso8601_rendering() {
        let dt = from_epoch_millis(1_672_531_200_250.0).unwrap();
        assert_eq!(to_iso8601(&dt), "2023-01-01T00:00:00.250Z");
    }
}
