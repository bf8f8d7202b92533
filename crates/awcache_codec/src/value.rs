//! Typed field values.

use crate::timestamp::Timestamp;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A decoded field value.
///
/// Both 32-bit counters and 64-bit bandwidth counters are held as `i64`;
/// the decoder enforces the narrower range where the schema asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Integer counter.
    Int(i64),
    /// Free text (URLs, referers).
    Text(String),
    /// Date, date/time or epoch-zero.
    Time(Timestamp),
}

impl FieldValue {
    /// Get this value as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a timestamp, if it is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Short name of the value kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Text(_) => "text",
            Self::Time(_) => "timestamp",
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `None` when the kinds differ.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the cache-file token for this value.
    #[must_use]
    pub fn to_token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Time(t) => write!(f, "{t}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Time(t) => t.serialize(serializer),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(t: Timestamp) -> Self {
        Self::Time(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        assert_eq!(FieldValue::Int(7).as_int(), Some(7));
        assert_eq!(FieldValue::Int(7).as_text(), None);
        assert_eq!(FieldValue::from("x").as_text(), Some("x"));
        assert_eq!(
            FieldValue::Time(Timestamp::EpochZero).as_timestamp(),
            Some(Timestamp::EpochZero)
        );
    }

    #[test]
    fn compare_same_kind_only() {
        assert_eq!(
            FieldValue::Int(1).compare(&FieldValue::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::from("b").compare(&FieldValue::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(FieldValue::Int(1).compare(&FieldValue::from("1")), None);
    }

    #[test]
    fn tokens() {
        assert_eq!(FieldValue::Int(-3).to_token(), "-3");
        assert_eq!(FieldValue::from("/index.html").to_token(), "/index.html");
        assert_eq!(FieldValue::Time(Timestamp::EpochZero).to_token(), "0");
    }

    #[test]
    fn serialize_json() {
        assert_eq!(serde_json::to_string(&FieldValue::Int(42)).unwrap(), "42");
        assert_eq!(
            serde_json::to_string(&FieldValue::from("a b")).unwrap(),
            "\"a b\""
        );
    }
}
