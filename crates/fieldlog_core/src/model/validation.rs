//! Recoverable validation errors and shared field validators.
//!
//! # Responsibility
//! - Define the user-facing `ValidationError` raised by `validate()`.
//! - Check names, IDs and free-text lists the same way for every entity.
//!
//! # Invariants
//! - Validators never touch storage and never mutate their input.
//! - Error messages route rule names through `i18n::tr`.

use crate::i18n::tr;
use crate::model::timestamp::Timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Character-level name pattern, exposed for name-entry UIs.
///
/// `validate_name` additionally rejects trailing dots/spaces and reserved
/// device names, which this pattern alone cannot express.
pub const VALID_NAME_PATTERN: &str = r"^[\p{L}\p{N}][\p{L}\p{N} _\-.,()\[\]+#&']+$";

static VALID_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(VALID_NAME_PATTERN).expect("valid name regex"));
static RESERVED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:CON|PRN|AUX|NUL|COM[0-9]|LPT[0-9])(?:\..*)?$")
        .expect("valid reserved name regex")
});

/// Violation of a validation rule. Recoverable: callers present it and let
/// the user correct the record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidName(String),
    InvalidId(String),
    InvalidLatitude(f64),
    InvalidLongitude(f64),
    InvalidTimestamp(Timestamp),
    DuplicateName(String),
    DuplicateId(String),
    InvalidUnit(String),
    InvalidMinMax { min: f64, max: f64 },
    InvalidPrecision(u32),
    InvalidValue(String),
    InvalidMeasurementType(Box<ValidationError>),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "{}: {value:?}", tr("invalid-name")),
            Self::InvalidId(value) => write!(f, "{}: {value:?}", tr("invalid-id")),
            Self::InvalidLatitude(value) => write!(f, "{}: {value}", tr("invalid-latitude")),
            Self::InvalidLongitude(value) => write!(f, "{}: {value}", tr("invalid-longitude")),
            Self::InvalidTimestamp(value) => write!(f, "{}: {value}", tr("invalid-timestamp")),
            Self::DuplicateName(value) => write!(f, "{}: {value}", tr("duplicate-name")),
            Self::DuplicateId(value) => write!(f, "{}: {value}", tr("duplicate-id")),
            Self::InvalidUnit(value) => write!(f, "{}: {value:?}", tr("invalid-unit")),
            Self::InvalidMinMax { min, max } => {
                write!(f, "{}: {min}>{max}", tr("invalid-min-max"))
            }
            Self::InvalidPrecision(value) => write!(f, "{}: {value}", tr("invalid-precision")),
            Self::InvalidValue(value) => write!(f, "{}: {value:?}", tr("invalid-value")),
            Self::InvalidMeasurementType(inner) => {
                write!(f, "{}: {inner}", tr("invalid-meas-type"))
            }
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMeasurementType(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

/// Returns whether `name` is usable as a record name (and thus a filename).
pub fn is_valid_name(name: &str) -> bool {
    VALID_NAME_RE.is_match(name)
        && !name.ends_with(['.', ' '])
        && !RESERVED_NAME_RE.is_match(name)
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string()))
    }
}

pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        Err(ValidationError::InvalidId(id.to_string()))
    } else {
        Ok(())
    }
}

/// Advisory checks for free-text lists such as checklists and task lists.
pub fn list_warnings(items: &[String]) -> Vec<String> {
    let trimmed: Vec<&str> = items.iter().map(|item| item.trim()).collect();
    let mut warnings = Vec::new();
    let unique: HashSet<&str> = trimmed.iter().copied().collect();
    if unique.len() != trimmed.len() {
        warnings.push(tr("list-duplicates"));
    }
    if trimmed.iter().any(|item| item.is_empty()) {
        warnings.push(tr("list-empty-lines"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::{is_valid_name, list_warnings, validate_id, ValidationError};

    #[test]
    fn reserved_names_are_case_insensitive_and_cover_extensions() {
        assert!(!is_valid_name("con"));
        assert!(!is_valid_name("LPT1.txt"));
        assert!(is_valid_name("CONSOLE"));
    }

    #[test]
    fn names_need_at_least_two_characters() {
        assert!(!is_valid_name("A"));
        assert!(!is_valid_name("7"));
        assert!(is_valid_name("A1"));
    }

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(
            validate_id("  ").unwrap_err(),
            ValidationError::InvalidId("  ".to_string())
        );
    }

    #[test]
    fn list_warnings_detect_duplicates_and_blanks() {
        let items = vec!["a".to_string(), " a".to_string(), "".to_string()];
        assert_eq!(list_warnings(&items).len(), 2);
        assert!(list_warnings(&["a".to_string(), "b".to_string()]).is_empty());
    }

    #[test]
    fn nested_error_exposes_source() {
        use std::error::Error;
        let err = ValidationError::InvalidMeasurementType(Box::new(ValidationError::InvalidUnit(
            " ".to_string(),
        )));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid measurement type"));
    }
}
