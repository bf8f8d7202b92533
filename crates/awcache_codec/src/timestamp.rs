//! Date and date/time tokens.
//!
//! Cache files store temporal values as bare digit runs:
//!
//! | token            | meaning                      |
//! |------------------|------------------------------|
//! | `YYYYMMDDhhmmss` | date and time of day         |
//! | `YYYYMMDD`       | calendar date                |
//! | `0`              | unknown / never (epoch-zero) |

use crate::error::{CodecError, CodecResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// A temporal field value.
///
/// `EpochZero` orders before every real date, so `min`/`max` merges treat
/// it as "no data". It is never used in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// The `0` sentinel.
    EpochZero,
    /// A calendar date (`YYYYMMDD`).
    Date(NaiveDate),
    /// A date and time of day (`YYYYMMDDhhmmss`).
    DateTime(NaiveDateTime),
}

impl Timestamp {
    /// Parses a cache-file token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidTimestamp`] if the token is not 14 or
    /// 8 digits (or the single character `0`), or if the digits do not
    /// name a real date and time.
    pub fn parse(token: &str) -> CodecResult<Self> {
        if token == "0" {
            return Ok(Self::EpochZero);
        }
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::invalid_timestamp(token));
        }

        let invalid = || CodecError::invalid_timestamp(token);
        match token.len() {
            14 => {
                let date = parse_date(&token[0..8]).ok_or_else(invalid)?;
                let time = NaiveTime::from_hms_opt(
                    digits(&token[8..10]),
                    digits(&token[10..12]),
                    digits(&token[12..14]),
                )
                .ok_or_else(invalid)?;
                Ok(Self::DateTime(date.and_time(time)))
            }
            8 => parse_date(token).map(Self::Date).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    /// Returns the cache-file token for this value.
    #[must_use]
    pub fn to_token(&self) -> String {
        self.to_string()
    }

    /// Returns true for the `0` sentinel.
    #[must_use]
    pub fn is_epoch_zero(&self) -> bool {
        matches!(self, Self::EpochZero)
    }

    /// Returns the instant this value denotes; dates map to midnight.
    #[must_use]
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            Self::EpochZero => None,
            Self::Date(d) => d.and_hms_opt(0, 0, 0),
            Self::DateTime(dt) => Some(*dt),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::EpochZero => 0,
            Self::Date(_) => 1,
            Self::DateTime(_) => 2,
        }
    }
}

// Fixed-width digit slices, already validated as ASCII digits.
fn digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let year = i32::try_from(digits(&s[0..4])).ok()?;
    NaiveDate::from_ymd_opt(year, digits(&s[4..6]), digits(&s[6..8]))
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        // None (epoch-zero) sorts first; a date ties with midnight of the
        // same day and then orders before the date/time.
        self.instant()
            .cmp(&other.instant())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpochZero => f.write_str("0"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl FromStr for Timestamp {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
