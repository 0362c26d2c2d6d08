//! Offset-preserving event timestamp codec
//!
//! The event bus writes ISO-8601 timestamps with an offset designator
//! (usually a trailing `Z`) and whatever sub-second precision the producing
//! service used. These helpers pin down the canonical wire form and plug
//! into serde `with` attributes:
//!
//! ```
//! use chrono::{DateTime, FixedOffset};
//! use serde::Deserialize;
//! use cloudwatch_dispatch::timestamp;
//!
//! #[derive(Debug, Deserialize)]
//! struct BackupFinished {
//!     #[serde(with = "timestamp")]
//!     completed: DateTime<FixedOffset>,
//! }
//! ```

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse an offset-bearing ISO-8601 datetime string.
///
/// The offset or `Z` designator is required; fractional seconds are
/// accepted at any precision and preserved to the nanosecond.
pub fn parse(text: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
}

/// Canonical wire form: `Z` for UTC offsets, sub-second digits only when
/// the instant carries them.
pub fn format(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S>(instant: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(instant))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}

/// serde `with` module for optional timestamp fields.
///
/// Absent and JSON-null values both decode to `None`; pair the attribute
/// with `default` so missing fields are tolerated.
pub mod option {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        instant: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match instant {
            Some(instant) => super::serialize(instant, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse(&text).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn parses_nanosecond_precision() {
        let instant = parse("2019-06-20T12:34:56.123456789Z").unwrap();
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2019, 6, 20, 12, 34, 56)
                .unwrap()
                .with_nanosecond(123_456_789)
                .unwrap()
        );
    }

    #[test]
    fn round_trips_fractional_seconds() {
        let wire = "2019-06-20T12:34:56.123456789Z";
        assert_eq!(format(&parse(wire).unwrap()), wire);
    }

    #[test]
    fn whole_seconds_format_without_fraction() {
        let wire = "2019-06-16T22:20:01Z";
        assert_eq!(format(&parse(wire).unwrap()), wire);
    }

    #[test]
    fn preserves_non_utc_offsets() {
        let wire = "2019-06-20T18:04:56+05:30";
        let instant = parse(wire).unwrap();
        assert_eq!(instant.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(format(&instant), wire);
    }

    #[test]
    fn rejects_missing_offset() {
        assert!(parse("2019-06-20T12:34:56").is_err());
        assert!(parse("not a timestamp").is_err());
    }
}
