//! Date display helpers: fixed day/month/year formatting plus a lenient
//! parser for the input shapes the UI and the backend exchange.
//!
//! Date-only wire values (`YYYY-MM-DD`) are rearranged textually so the
//! calendar date never shifts with the process timezone.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Exact `YYYY-MM-DD` shape check, bytes only.
fn is_date_only(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10 && has_iso_date_prefix(b)
}

fn has_iso_date_prefix(b: &[u8]) -> bool {
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

/// Format any supported date value as `DD/MM/YYYY`.
///
/// A bare `YYYY-MM-DD` string is permuted field-by-field; everything else goes
/// through [`parse_date_time`]. Absent or unparseable input yields `""`.
pub fn format_date(value: Option<&str>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    let v = v.trim();
    if v.is_empty() {
        return String::new();
    }
    if is_date_only(v) {
        let (y, rest) = v.split_at(4);
        return format!("{}/{}/{}", &rest[4..6], &rest[1..3], y);
    }
    match parse_date_time(v) {
        Some(dt) => format_parsed_date(dt),
        None => String::new(),
    }
}

/// Format any supported date value as `DD/MM/YYYY HH:MM` (24-hour).
///
/// Absent or unparseable input yields `""`.
pub fn format_date_time(value: Option<&str>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    match parse_date_time(v) {
        Some(dt) => format_parsed_date_time(dt),
        None => String::new(),
    }
}

pub fn format_parsed_date(dt: NaiveDateTime) -> String {
    dt.format(DATE_FORMAT).to_string()
}

pub fn format_parsed_date_time(dt: NaiveDateTime) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

/// Lenient parse of a date/time string into local wall-clock time.
///
/// Accepted shapes:
/// - RFC 3339 timestamps (converted to the local offset)
/// - `YYYY-MM-DD[T| ]HH:MM[:SS[.frac]]` without an offset, taken as-is
/// - bare `YYYY-MM-DD`, taken as midnight
/// - `D/M/YYYY` and `D/M/YYYY H:MM`, hour defaulting to midnight
///
/// Anything else, including calendar-invalid fields, yields `None`.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    if has_iso_date_prefix(v.as_bytes()) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        for fmt in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(v, fmt) {
                return Some(dt);
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
            return d.and_hms_opt(0, 0, 0);
        }
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(v, "%d/%m/%Y %H:%M") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(v, "%d/%m/%Y") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_is_permuted_without_calendar_math() {
        // inside the European DST transition window; must not shift
        assert_eq!(format_date(Some("2024-03-31")), "31/03/2024");
        assert_eq!(format_date(Some("2024-10-27")), "27/10/2024");
        assert_eq!(format_date(Some("1999-01-02")), "02/01/1999");
    }

    #[test]
    fn absent_or_garbage_input_formats_to_empty() {
        assert_eq!(format_date(None), "");
        assert_eq!(format_date(Some("")), "");
        assert_eq!(format_date(Some("not-a-date")), "");
        assert_eq!(format_date_time(None), "");
        assert_eq!(format_date_time(Some("nope")), "");
    }

    #[test]
    fn naive_timestamps_format_without_offset_shift() {
        assert_eq!(format_date(Some("2024-03-05T10:00:00")), "05/03/2024");
        assert_eq!(format_date_time(Some("2024-03-05 08:05:00")), "05/03/2024 08:05");
        assert_eq!(format_date_time(Some("2024-03-05")), "05/03/2024 00:00");
    }

    #[test]
    fn rfc3339_input_parses_without_failing() {
        assert!(parse_date_time("2024-03-05T10:00:00Z").is_some());
        assert!(parse_date_time("2024-03-05T10:00:00+02:00").is_some());
        assert!(parse_date_time("2024-03-05T10:00:00.250Z").is_some());
    }

    #[test]
    fn slash_dates_parse_and_reformat_zero_padded() {
        let dt = parse_date_time("5/3/2024").unwrap();
        assert_eq!(format_parsed_date(dt), "05/03/2024");
        assert_eq!(format_parsed_date_time(dt), "05/03/2024 00:00");

        let dt = parse_date_time("5/3/2024 9:07").unwrap();
        assert_eq!(format_parsed_date_time(dt), "05/03/2024 09:07");
    }

    #[test]
    fn date_time_round_trip() {
        let dt = parse_date_time("05/03/2024 14:30").unwrap();
        assert_eq!(format_parsed_date_time(dt), "05/03/2024 14:30");
    }

    #[test]
    fn calendar_invalid_fields_are_rejected() {
        assert!(parse_date_time("2024-13-45").is_none());
        assert!(parse_date_time("31/02/2024").is_none());
        assert!(parse_date_time("05/03/2024 25:00").is_none());
        assert!(parse_date_time("   ").is_none());
    }
}
