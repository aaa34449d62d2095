//! Measurement types and recorded measurements.
//!
//! # Responsibility
//! - Describe what can be measured (`MeasurementType`, the template side).
//! - Record actual measured values (`Measurement`, the instance side).
//!
//! # Invariants
//! - Measurement values are decimal strings, never floats, so no precision
//!   is lost between entry and export.
//! - A measurement's template is its own `MeasurementType`.

use crate::i18n::tr;
use crate::ids::now_millis;
use crate::model::common::{
    is_blank, nullable, serialize_trimmed, trimmed_eq, validate_children, DataObjectBase,
    DataObjectTemplate, DataObjectWithTemplate, HasEquals,
};
use crate::model::timestamp::{validate_timestamp, Timestamp};
use crate::model::validation::{validate_name, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Largest `fractional_digits` accepted by validation.
pub const MAX_FRACTIONAL_DIGITS: u32 = 20;

static VALID_UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S(?:.*\S)?$").expect("valid unit regex"));
// group 1 or 2 holds the digits after the point, if any
static DECIMAL_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\-+]?(?:[0-9]+(?:\.([0-9]+))?|\.([0-9]+))$").expect("valid decimal regex")
});

/// Describes a kind of measurement, not a specific value.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MeasurementType {
    /// Human-readable identifier, e.g. `Temperature`.
    pub id: String,
    pub unit: String,
    /// Lower bound for plausibility warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound for plausibility warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Places after the decimal point, for input validation and display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fractional_digits: Option<u32>,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub notes: String,
}

impl MeasurementType {
    pub fn new(id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unit: unit.into(),
            min: None,
            max: None,
            fractional_digits: None,
            notes: String::new(),
        }
    }

    /// Column/display identifier: `id[unit]`, or the bare id for unitless
    /// types.
    pub fn type_id(&self) -> String {
        let id = self.id.trim();
        let unit = self.unit.trim();
        let unitless = unit == id
            || unit.eq_ignore_ascii_case("unitless")
            || unit.eq_ignore_ascii_case("dimensionless")
            || unit == "-";
        if !id.is_empty() && unitless {
            self.id.clone()
        } else {
            format!(
                "{}[{}]",
                if id.is_empty() { "?" } else { self.id.as_str() },
                if unit.is_empty() { "?" } else { self.unit.as_str() }
            )
        }
    }

    /// Regular expression source that valid measurement values must match.
    pub fn valid_pattern(&self) -> String {
        let after = match self.fractional_digits {
            None => "[0-9]+".to_string(),
            Some(0) => String::new(),
            Some(1) => "[0-9]".to_string(),
            Some(n) => format!("[0-9]{{1,{n}}}"),
        };
        if after.is_empty() {
            r"^[\-+]?[0-9]+$".to_string()
        } else {
            format!(r"^[\-+]?(?:[0-9]+(?:\.{after})?|\.{after})$")
        }
    }

    /// Whether `value` matches `valid_pattern()`.
    pub fn is_valid_value(&self, value: &str) -> bool {
        let Some(caps) = DECIMAL_VALUE_RE.captures(value) else {
            return false;
        };
        let fraction = caps.get(1).or_else(|| caps.get(2)).map_or(0, |m| m.as_str().len());
        match self.fractional_digits {
            None => true,
            Some(0) => fraction == 0,
            Some(n) => fraction <= n as usize,
        }
    }

    /// Human-readable range, e.g. `0.0 - 14.0`, `>= 0`, or empty.
    pub fn range_as_text(&self) -> String {
        let fmt = |v: f64| match self.fractional_digits {
            Some(digits) => format!("{v:.prec$}", prec = digits.min(MAX_FRACTIONAL_DIGITS) as usize),
            None => v.to_string(),
        };
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{} - {}", fmt(min), fmt(max)),
            (Some(min), None) => format!(">= {}", fmt(min)),
            (None, Some(max)) => format!("<= {}", fmt(max)),
            (None, None) => String::new(),
        }
    }
}

impl HasEquals for MeasurementType {
    fn equals(&self, other: &Self) -> bool {
        self.id == other.id
            && self.unit == other.unit
            && self.min == other.min
            && self.max == other.max
            && self.fractional_digits == other.fractional_digits
            && trimmed_eq(&self.notes, &other.notes)
    }
}

impl DataObjectBase for MeasurementType {
    const TYPE_NAME: &'static str = "measurement type";

    fn validate(&self, others: &[Self]) -> Result<(), ValidationError> {
        validate_name(&self.id)?;
        if !VALID_UNIT_RE.is_match(&self.unit) {
            return Err(ValidationError::InvalidUnit(self.unit.clone()));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ValidationError::InvalidMinMax { min, max });
            }
        }
        if let Some(digits) = self.fractional_digits.filter(|d| *d > MAX_FRACTIONAL_DIGITS) {
            return Err(ValidationError::InvalidPrecision(digits));
        }
        if others.iter().any(|o| o.id == self.id) {
            return Err(ValidationError::DuplicateName(self.id.clone()));
        }
        Ok(())
    }

    fn warnings_check(&self, _skip_init_warns: bool) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.min.is_none() {
            warnings.push(tr("no-min"));
        }
        if self.max.is_none() {
            warnings.push(tr("no-max"));
        }
        if self.fractional_digits.is_none() {
            warnings.push(tr("no-precision"));
        }
        warnings
    }
}

impl DataObjectTemplate for MeasurementType {
    type Object = Measurement;

    fn template_to_object(&self) -> Measurement {
        Measurement {
            kind: self.deep_clone(),
            time: now_millis(),
            value: String::new(),
        }
    }
}

/// An actual recorded measurement.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Measurement {
    #[serde(rename = "type")]
    pub kind: MeasurementType,
    pub time: Timestamp,
    /// Decimal string; may be empty right after creation.
    pub value: String,
}

impl Measurement {
    pub fn new(kind: MeasurementType, time: Timestamp, value: impl Into<String>) -> Self {
        Self {
            kind,
            time,
            value: value.into(),
        }
    }
}

impl HasEquals for Measurement {
    fn equals(&self, other: &Self) -> bool {
        self.kind.equals(&other.kind) && self.time == other.time && self.value == other.value
    }
}

impl DataObjectBase for Measurement {
    const TYPE_NAME: &'static str = "measurement";

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationError> {
        self.kind
            .validate(&[])
            .map_err(|err| ValidationError::InvalidMeasurementType(Box::new(err)))?;
        validate_timestamp(self.time)?;
        if !self.kind.is_valid_value(&self.value) {
            return Err(ValidationError::InvalidValue(self.value.clone()));
        }
        Ok(())
    }

    fn warnings_check(&self, _skip_init_warns: bool) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.time.is_set() {
            warnings.push(tr("no-timestamp"));
        }
        if !self.kind.is_valid_value(&self.value) {
            warnings.push(tr("invalid-value"));
            return warnings;
        }
        if let Ok(value) = self.value.parse::<f64>() {
            if let Some(min) = self.kind.min.filter(|min| value < *min) {
                warnings.push(format!("{}: {} < {min}", tr("meas-below-min"), self.value));
            }
            if let Some(max) = self.kind.max.filter(|max| value > *max) {
                warnings.push(format!("{}: {} > {max}", tr("meas-above-max"), self.value));
            }
        }
        warnings
    }
}

impl DataObjectWithTemplate for Measurement {
    type Template = MeasurementType;

    fn template(&self) -> Option<&MeasurementType> {
        Some(&self.kind)
    }

    fn extract_template(&self) -> MeasurementType {
        self.kind.deep_clone()
    }
}

/// Validates a list of measurement types against each other.
pub(crate) fn validate_measurement_types(types: &[MeasurementType]) -> Result<(), ValidationError> {
    validate_children(types)
}
