//! Calendar keys that identify daily and monthly aggregates.
//!
//! Both keys render in a fixed-width textual form (`YYYY-MM-DD` and
//! `YYYY-MM`), so their string order and their chronological order agree.

use core::fmt;
use core::str::FromStr;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::error::{ParseError, ParseResult};

/// A calendar day, the natural key of the history tier.
///
/// # Examples
///
/// ```
/// use gasmon_types::DayKey;
///
/// let day: DayKey = "2025-03-09".parse().unwrap();
/// assert_eq!(day.to_string(), "2025-03-09");
/// assert_eq!(day.month().to_string(), "2025-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(Date);

impl DayKey {
    /// Wrap a calendar date.
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    /// The UTC calendar day of a timestamp.
    pub fn of(timestamp: OffsetDateTime) -> Self {
        Self(timestamp.to_offset(UtcOffset::UTC).date())
    }

    /// The wrapped date.
    pub const fn date(&self) -> Date {
        self.0
    }

    /// The month this day belongs to.
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.0)
    }

    /// Parse a strict `YYYY-MM-DD` string, or fall back to an RFC 3339
    /// timestamp whose UTC date is used.
    pub fn parse_lenient(s: &str) -> ParseResult<Self> {
        let s = s.trim();
        s.parse().or_else(|_| {
            OffsetDateTime::parse(s, &Rfc3339)
                .map(Self::of)
                .map_err(|_| ParseError::InvalidDate(s.to_string()))
        })
    }
}

impl From<Date> for DayKey {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl FromStr for DayKey {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|_| ParseError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

/// A calendar month, the natural key of the monthly tier.
///
/// Only four-digit years are representable, matching the `YYYY-MM` wire form.
///
/// # Examples
///
/// ```
/// use gasmon_types::MonthKey;
///
/// let month: MonthKey = "2024-12".parse().unwrap();
/// assert_eq!(month.year(), 2024);
/// assert_eq!(month.month_number(), 12);
/// assert!("2024-13".parse::<MonthKey>().is_err());
/// assert!("2024-1".parse::<MonthKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// Build a month key, validating the month number (1-12).
    pub fn new(year: i32, month: u8) -> ParseResult<Self> {
        if !(0..=9999).contains(&year) || Month::try_from(month).is_err() {
            return Err(ParseError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing a calendar date.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    /// Calendar year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1 through 12.
    pub const fn month_number(&self) -> u8 {
        self.month
    }

    /// Short label such as `Mar 2025`, as used on chart axes.
    pub fn short_label(&self) -> String {
        let name = Month::try_from(self.month)
            .map(|m| m.to_string())
            .unwrap_or_default();
        format!("{} {}", &name[..name.len().min(3)], self.year)
    }
}

impl FromStr for MonthKey {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        let invalid = || ParseError::InvalidMonth(s.to_string());
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(invalid());
        }

        let year: i32 = s[..4].parse().map_err(|_| invalid())?;
        let month: u8 = s[5..].parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{DayKey, MonthKey};

    impl Serialize for DayKey {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for DayKey {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }

    impl Serialize for MonthKey {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for MonthKey {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }
}
