//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;

/// DateTime is the alias of [`chrono::DateTime<Utc>`].
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a time into an RFC 3339 / ISO 8601 UTC timestamp with
/// second precision: `2022-03-01T08:12:34Z`.
///
/// The signing protocol accepts either zero or seven fractional-second
/// digits. We strip fractional seconds entirely rather than expanding to
/// seven digits; this is a compatibility choice validated against the
/// 2019-12-12 service behavior rather than the published documentation.
pub fn format_rfc3339(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an RFC 3339 timestamp into a [`DateTime`].
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("invalid rfc3339 timestamp: {s}")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_rfc3339_has_no_fractional_seconds() {
        // nanoseconds present in the input must not leak into the output
        let t = Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34).unwrap()
            + chrono::TimeDelta::nanoseconds(123_456_789);
        assert_eq!(format_rfc3339(t), "2022-03-01T08:12:34Z");
    }

    #[test]
    fn test_format_rfc3339_matches_wire_pattern() {
        let s = format_rfc3339(now());
        assert_eq!(s.len(), 20);
        assert!(s.ends_with('Z'));
        assert!(!s.contains('.'));
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], "T");
    }

    #[test]
    fn test_parse_rfc3339_round_trip() {
        let t = parse_rfc3339("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(format_rfc3339(t), "2024-01-01T00:00:00Z");

        assert!(parse_rfc3339("yesterday").is_err());
    }
}
