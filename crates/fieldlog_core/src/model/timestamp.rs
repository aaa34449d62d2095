//! Millisecond timestamps with an explicit "unset" state.
//!
//! # Invariants
//! - `NO_TIMESTAMP` is the only unset value; JSON `null` maps to it.
//! - Two unset timestamps are equal; set timestamps compare exactly.
//! - A usable timestamp lies strictly inside `(0, MAX_TIMESTAMP)`.

use crate::model::validation::ValidationError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// 3000-01-01T00:00:00Z in epoch milliseconds (exclusive upper bound).
pub const MAX_TIMESTAMP: i64 = 32_503_680_000_000;

/// Unix epoch milliseconds, or unset.
///
/// The JSON key is required wherever a `Timestamp` field is declared without
/// a default: a missing key is rejected, `null` loads as unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Timestamp(Option<i64>);

/// The "unset" timestamp.
pub const NO_TIMESTAMP: Timestamp = Timestamp(None);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(Some(millis))
    }

    /// Raw milliseconds, `None` when unset.
    pub fn millis(self) -> Option<i64> {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0.is_some()
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_none()
    }

    /// Set and strictly within `(0, MAX_TIMESTAMP)`.
    pub fn is_valid_and_set(self) -> bool {
        matches!(self.0, Some(ms) if ms > 0 && ms < MAX_TIMESTAMP)
    }

    /// ISO 8601 UTC rendering with millisecond precision, `None` when not
    /// valid and set.
    pub fn to_iso8601(self) -> Option<String> {
        if !self.is_valid_and_set() {
            return None;
        }
        self.to_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Calendar date (`YYYY-MM-DD`, UTC), `None` when not valid and set.
    pub fn to_date_string(self) -> Option<String> {
        if !self.is_valid_and_set() {
            return None;
        }
        self.to_datetime()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
    }

    fn to_datetime(self) -> Option<DateTime<Utc>> {
        self.0.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    /// Sort key where unset sorts after every set value.
    pub(crate) fn sort_key(self) -> i64 {
        self.0.unwrap_or(i64::MAX)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::from_millis(value)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(ms) => write!(f, "{ms}"),
            None => write!(f, "unset"),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("epoch milliseconds or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Timestamp, E> {
        Ok(NO_TIMESTAMP)
    }

    fn visit_none<E: de::Error>(self) -> Result<Timestamp, E> {
        Ok(NO_TIMESTAMP)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Timestamp, E> {
        Ok(Timestamp::from_millis(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Timestamp, E> {
        i64::try_from(value)
            .map(Timestamp::from_millis)
            .map_err(|_| E::custom(format!("timestamp out of range: {value}")))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Timestamp, E> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(Timestamp::from_millis(value as i64))
        } else {
            Err(E::custom(format!("timestamp must be whole milliseconds: {value}")))
        }
    }
}

/// Accepts unset timestamps and set timestamps within range.
pub fn validate_timestamp(t: Timestamp) -> Result<(), ValidationError> {
    if t.is_unset() || t.is_valid_and_set() {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimestamp(t))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_timestamp, Timestamp, MAX_TIMESTAMP, NO_TIMESTAMP};

    #[test]
    fn unset_timestamps_are_equal() {
        assert_eq!(NO_TIMESTAMP, Timestamp::default());
        assert_ne!(NO_TIMESTAMP, Timestamp::from_millis(1));
    }

    #[test]
    fn valid_and_set_bounds() {
        assert!(!Timestamp::from_millis(0).is_valid_and_set());
        assert!(!Timestamp::from_millis(MAX_TIMESTAMP).is_valid_and_set());
        assert!(Timestamp::from_millis(MAX_TIMESTAMP - 1).is_valid_and_set());
        assert!(!NO_TIMESTAMP.is_valid_and_set());
    }

    #[test]
    fn validate_accepts_unset_and_rejects_negative() {
        assert!(validate_timestamp(NO_TIMESTAMP).is_ok());
        assert!(validate_timestamp(Timestamp::from_millis(-5)).is_err());
    }

    #[test]
    fn iso8601_uses_utc_millis() {
        let t = Timestamp::from_millis(1_735_786_980_000);
        assert_eq!(t.to_iso8601().as_deref(), Some("2025-01-02T03:03:00.000Z"));
        assert_eq!(t.to_date_string().as_deref(), Some("2025-01-02"));
        assert_eq!(NO_TIMESTAMP.to_iso8601(), None);
    }

    #[test]
    fn json_null_is_unset() {
        let t: Timestamp = serde_json::from_str("null").unwrap();
        assert!(t.is_unset());
        assert_eq!(serde_json::to_string(&Timestamp::from_millis(42)).unwrap(), "42");
        assert!(serde_json::from_str::<Timestamp>("\"2025-01-01\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("1.5").is_err());
    }
}
