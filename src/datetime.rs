//! Publication timestamp parsing.
//!
//! The listing site stamps every vacancy card with an ISO-8601 time
//! carrying a UTC offset, e.g. `2022-06-08T19:34:01+03:00`. We keep the
//! wall-clock fields exactly as published and drop only the offset; this
//! is deliberately "local time as published", not a timezone conversion.

use chrono::{DateTime, NaiveDateTime};

use crate::error::GrabError;

/// Capability seam for turning a site-supplied timestamp string into a
/// canonical local timestamp. Kept narrow so tests can plug in fixed
/// parsers.
pub trait DateTimeParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<NaiveDateTime, GrabError>;
}

/// Parser for career.habr.com's offset date-time format.
#[derive(Debug, Default, Clone, Copy)]
pub struct HabrDateTimeParser;

impl DateTimeParser for HabrDateTimeParser {
    fn parse(&self, raw: &str) -> Result<NaiveDateTime, GrabError> {
        let parsed = DateTime::parse_from_rfc3339(raw).map_err(|source| {
            GrabError::MalformedTimestamp {
                value: raw.to_string(),
                source,
            }
        })?;
        // naive_local() keeps the printed fields; no shift to UTC.
        Ok(parsed.naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_drops_offset_keeps_local_fields() {
        let parser = HabrDateTimeParser;
        let parsed = parser.parse("2022-06-08T19:34:01+03:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2022, 6, 8)
            .unwrap()
            .and_hms_opt(19, 34, 1)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_is_not_a_utc_conversion() {
        let parser = HabrDateTimeParser;
        let plus = parser.parse("2022-06-09T10:00:00+03:00").unwrap();
        let minus = parser.parse("2022-06-09T10:00:00-05:00").unwrap();
        // Same printed fields, different offsets: both keep 10:00.
        assert_eq!(plus, minus);
        assert_eq!(plus.to_string(), "2022-06-09 10:00:00");
    }

    #[test]
    fn test_parse_reformat_is_idempotent() {
        let parser = HabrDateTimeParser;
        let first = parser.parse("2022-06-08T19:34:01+03:00").unwrap();
        let reparsed = parser
            .parse(&format!("{}+03:00", first.format("%Y-%m-%dT%H:%M:%S")))
            .unwrap();
        assert_eq!(first, reparsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let parser = HabrDateTimeParser;
        let err = parser.parse("yesterday at noon").unwrap_err();
        assert!(matches!(err, GrabError::MalformedTimestamp { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_offset() {
        let parser = HabrDateTimeParser;
        assert!(parser.parse("2022-06-08T19:34:01").is_err());
    }
}
