// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Datetime and calendar-date scalars.
//!
//! Document stores persist datetimes as 64-bit epoch-millisecond integers;
//! [`Timestamp`] is the corresponding scalar, kept deliberately dumb: an
//! `i64` of milliseconds since the UNIX epoch, truncated to millisecond
//! precision and (with the `chrono` feature) constrained to years 0 to 9999
//! so it stays representable everywhere.
//!
//! Calendar dates without a time component are persisted as `yyyymmdd`
//! integers (e.g. `20210712`); [`date_to_number`] and [`date_from_number`]
//! implement that codec.

use std::fmt;

#[cfg(feature = "chrono")]
use chrono::{DateTime, Datelike, NaiveDate, Utc};
#[cfg(feature = "chrono")]
use std::str::FromStr;

/// Error returned when creating or parsing a [`Timestamp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The year is outside the supported range of `0` to `9999`.
    InvalidYear(i32),
    /// The string could not be parsed as a valid RFC 3339 datetime.
    Parse(String),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::InvalidYear(year) => write!(
                f,
                "invalid year {year}, supported years are between 0 and 9999 included"
            ),
            TimestampError::Parse(s) => {
                write!(f, "failed to parse date {s} in rfc3339 format")
            }
        }
    }
}

impl std::error::Error for TimestampError {}

/// A UTC datetime with millisecond precision.
///
/// Stored as an `i64` of milliseconds since the UNIX epoch, which is also its
/// storage representation inside documents and update operations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a new `Timestamp` from a `chrono::DateTime<Utc>`.
    ///
    /// The datetime is truncated to millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is outside the supported range of `0` to
    /// `9999`.
    #[cfg(feature = "chrono")]
    pub fn new(datetime: DateTime<Utc>) -> Result<Timestamp, TimestampError> {
        let year = datetime.year();
        // NOTE: This is arguably more clear.
        #[expect(clippy::manual_range_contains)]
        if year < 0 || year > 9999 {
            return Err(TimestampError::InvalidYear(year));
        }
        Ok(Timestamp(datetime.timestamp_millis()))
    }

    /// Creates a `Timestamp` from a number of milliseconds since the UNIX
    /// epoch.
    ///
    /// Returns `None` if the number of milliseconds corresponds to a datetime
    /// outside the supported range.
    #[cfg(feature = "chrono")]
    pub fn from_millis(milliseconds: i64) -> Option<Self> {
        let datetime = DateTime::from_timestamp_millis(milliseconds)?;
        Timestamp::new(datetime).ok()
    }

    /// Creates a `Timestamp` from a number of milliseconds since the UNIX
    /// epoch. Without `chrono` there is no range to enforce, so this always
    /// succeeds.
    #[cfg(not(feature = "chrono"))]
    pub fn from_millis(milliseconds: i64) -> Option<Self> {
        Some(Self(milliseconds))
    }

    /// The current time, truncated to millisecond precision.
    #[cfg(feature = "chrono")]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Returns the number of milliseconds since the UNIX epoch.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Converts the `Timestamp` to a `chrono::DateTime<Utc>`.
    #[cfg(feature = "chrono")]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0)
            .expect("validated against the supported year range on construction")
    }
}

impl From<Timestamp> for serde_json::Value {
    fn from(value: Timestamp) -> Self {
        value.0.into()
    }
}

#[cfg(feature = "chrono")]
impl From<DateTime<Utc>> for Timestamp {
    /// Truncates to millisecond precision without validating the year range;
    /// prefer [`Timestamp::new`] when the input is untrusted.
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

#[cfg(feature = "chrono")]
impl fmt::Display for Timestamp {
    // Formats the `Timestamp` as an RFC 3339 string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_datetime().fmt(f)
    }
}

#[cfg(not(feature = "chrono"))]
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(feature = "chrono")]
impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let datetime =
            DateTime::parse_from_rfc3339(s).map_err(|_| TimestampError::Parse(s.to_string()))?;
        Timestamp::new(datetime.to_utc())
    }
}

/// Encodes a calendar date as a `yyyymmdd` integer, e.g. `2021-07-12` as
/// `20210712`.
#[cfg(feature = "chrono")]
pub fn date_to_number(date: NaiveDate) -> i32 {
    date.year() * 10000 + date.month() as i32 * 100 + date.day() as i32
}

/// Decodes a `yyyymmdd` integer back into a calendar date.
///
/// Returns `None` if the integer does not name a valid date.
#[cfg(feature = "chrono")]
pub fn date_from_number(number: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(number / 10000, (number / 100 % 100) as u32, (number % 100) as u32)
}

#[cfg(all(test, feature = "chrono"))]
mod tests {
    use super::*;

    #[test]
    fn new_timestamp_truncates_at_millisecond_precision() {
        assert_eq!(
            "1996-12-19T16:39:57.123555Z".parse::<Timestamp>().unwrap(),
            "1996-12-19T16:39:57.123Z".parse::<Timestamp>().unwrap()
        )
    }

    #[test]
    fn timestamp_constructors() {
        let unparsable_timestamp: Result<Timestamp, _> = "0000-01-01T00:00:00ZTR".parse();
        assert!(unparsable_timestamp.is_err());

        let out_of_range_year = DateTime::<Utc>::UNIX_EPOCH.with_year(10_000).unwrap();
        assert!(Timestamp::new(out_of_range_year).is_err());

        let parseable_timestamp: Result<Timestamp, _> = "0000-01-01T00:00:00Z".parse();
        assert!(parseable_timestamp.is_ok())
    }

    #[test]
    fn millis_round_trip() {
        let ts = "2021-07-12T08:30:00Z".parse::<Timestamp>().unwrap();
        assert_eq!(Timestamp::from_millis(ts.as_millis()), Some(ts));
    }

    #[test]
    fn parse_accepts_any_timezone() {
        assert_eq!(
            "0000-01-01T00:00:00Z".parse::<Timestamp>().unwrap(),
            "0000-01-01T01:00:00+01:00".parse::<Timestamp>().unwrap()
        );
    }

    #[test]
    fn date_number_codec() {
        let date = NaiveDate::from_ymd_opt(2021, 7, 12).unwrap();
        assert_eq!(date_to_number(date), 20210712);
        assert_eq!(date_from_number(20210712), Some(date));
        assert_eq!(date_from_number(20210230), None);
    }
}
