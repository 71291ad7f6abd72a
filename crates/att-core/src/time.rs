//! Time encodings used by status changes.
//!
//! Status-change times arrive either as a bare local `HH:MM` or as an
//! RFC 3339 instant. Both are normalized to a [`DayMinute`] relative to the
//! record date before any arithmetic happens.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes since local midnight of a record date, in `0..=1440`.
///
/// `1440` is the end-of-day boundary and renders as `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DayMinute(u16);

impl DayMinute {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Creates a minute offset, rejecting values past the end of the day.
    pub const fn new(minutes: u16) -> Option<Self> {
        if minutes <= MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Creates a minute offset from a wall-clock hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        u16::try_from(hour * 60 + minute).ok().map(Self)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Minutes from `self` until `later`, zero if `later` is earlier.
    pub const fn minutes_until(self, later: Self) -> u16 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for DayMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Why a raw time string could not be placed on the record's day.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("expected HH:MM or an RFC 3339 timestamp")]
    Unrecognized,

    #[error("local time is outside 00:00..=23:59")]
    OutOfRange,

    #[error("instant falls on {actual}, not on record date {expected}")]
    OtherDay {
        expected: NaiveDate,
        actual: NaiveDate,
    },
}

/// A parsed status-change time, before it is placed on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    /// Bare `HH:MM`, interpreted as local time on the record date.
    Local(DayMinute),
    /// Absolute instant, projected into the configured offset.
    Absolute(DateTime<FixedOffset>),
}

impl TimeValue {
    /// Parses either encoding.
    pub fn parse(raw: &str) -> Result<Self, TimeParseError> {
        let raw = raw.trim();
        if let Some(minute) = parse_hhmm(raw)? {
            return Ok(Self::Local(minute));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(Self::Absolute)
            .map_err(|_| TimeParseError::Unrecognized)
    }

    /// Resolves to minutes since local midnight of `date`.
    ///
    /// Seconds of absolute instants are truncated.
    pub fn resolve(
        self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<DayMinute, TimeParseError> {
        match self {
            Self::Local(minute) => Ok(minute),
            Self::Absolute(instant) => {
                let local = instant.with_timezone(&offset);
                let actual = local.date_naive();
                if actual != date {
                    return Err(TimeParseError::OtherDay {
                        expected: date,
                        actual,
                    });
                }
                DayMinute::from_hm(local.hour(), local.minute()).ok_or(TimeParseError::OutOfRange)
            }
        }
    }
}

/// Parses a zero-padded `HH:MM`. Returns `Ok(None)` when the shape does not match.
fn parse_hhmm(raw: &str) -> Result<Option<DayMinute>, TimeParseError> {
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Ok(None);
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Ok(None);
    }
    let [h1, h2, m1, m2] = digits.map(|b| u32::from(b - b'0'));
    DayMinute::from_hm(h1 * 10 + h2, m1 * 10 + m2)
        .map(Some)
        .ok_or(TimeParseError::OutOfRange)
}

/// Where an unterminated final segment ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndOfDay {
    /// Ends at `24:00` of the same day.
    #[default]
    Midnight,
    /// Ends at the same instant, labelled `00:00` of the next day.
    NextDayMidnight,
    /// Ends at `23:59`, one minute short of the full day.
    LastMinute,
}

impl EndOfDay {
    /// The minute the final segment is closed at.
    pub const fn boundary(self) -> DayMinute {
        match self {
            Self::Midnight | Self::NextDayMidnight => DayMinute::END_OF_DAY,
            Self::LastMinute => DayMinute(MINUTES_PER_DAY - 1),
        }
    }

    /// Renders an end minute according to this policy.
    pub fn label(self, minute: DayMinute) -> String {
        match self {
            Self::NextDayMidnight if minute == DayMinute::END_OF_DAY => "00:00".to_string(),
            _ => minute.to_string(),
        }
    }
}
