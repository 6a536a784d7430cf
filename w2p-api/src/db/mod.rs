//! Database access layer for w2p-api
//!
//! Identifiers are stored as UUID text and timestamps as RFC 3339 UTC text
//! with fixed microsecond precision, so text order matches time order.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;
use w2p_common::{Error, Result};

pub mod ideas;
pub mod plan_items;
pub mod plans;

/// Current time at storage precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Truncate a caller-supplied time to storage precision
pub fn to_storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("timestamp {:?}: {}", text, e)))
}

pub(crate) fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| Error::Corrupt(format!("id {:?}: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_text_round_trip() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 23, 19, 30, 0).unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2026-10-23T19:30:00.000000Z");
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let earlier = format_timestamp(&Utc.with_ymd_and_hms(2026, 1, 9, 23, 0, 0).unwrap());
        let later = format_timestamp(&Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_corrupt_values_are_internal_errors() {
        assert!(matches!(parse_timestamp("yesterday"), Err(Error::Corrupt(_))));
        assert!(matches!(parse_uuid("not-a-uuid"), Err(Error::Corrupt(_))));
    }
}
