//! Base contract shared by every template and instance record.
//!
//! # Responsibility
//! - Define `DataObjectBase` (validate, warnings, equality, JSON, clone) and
//!   the template/instance pairing traits.
//! - Own the strict JSON boundary: loading rejects unknown keys, missing
//!   required keys and mistyped values with a `DeserializationError`.
//!
//! # Invariants
//! - `deep_clone` is serialize -> parse -> reconstruct; a field that cannot
//!   round-trip through JSON breaks cloning.
//! - Serialization is sparse: blank optional fields are omitted.

use crate::model::validation::ValidationError;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Semantic equality used by multiset comparison.
pub trait HasEquals {
    /// Structural equality that ignores identity, audit fields and template
    /// back-references.
    fn equals(&self, other: &Self) -> bool;
}

/// Contract implemented by every persisted record.
pub trait DataObjectBase: HasEquals + Serialize + DeserializeOwned + Sized {
    /// Record kind used in diagnostics and load errors.
    const TYPE_NAME: &'static str;

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    /// Checks hard rules against caller-supplied siblings.
    ///
    /// `others` must not contain `self`.
    fn validate(&self, others: &[Self]) -> Result<(), ValidationError>;

    /// Advisory checks; never fails. `skip_init_warns` suppresses warnings
    /// that are expected on a freshly created record.
    fn warnings_check(&self, skip_init_warns: bool) -> Vec<String>;

    /// Canonical JSON form.
    fn to_json(&self) -> Value {
        serde_json::to_value(self).expect("record serialization must not fail")
    }

    /// Strictly parses a JSON value into this record type.
    fn from_json(value: Value) -> Result<Self, DeserializationError> {
        serde_json::from_value(value).map_err(|err| {
            warn!(
                "event=deserialize_rejected module=model status=error type={}",
                Self::TYPE_NAME
            );
            DeserializationError::new(Self::TYPE_NAME, err)
        })
    }

    /// Strictly parses JSON text into this record type.
    fn from_json_str(text: &str) -> Result<Self, DeserializationError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| DeserializationError::new(Self::TYPE_NAME, err))?;
        Self::from_json(value)
    }

    /// Independent copy reconstructed from the serialized form.
    fn deep_clone(&self) -> Self {
        Self::from_json(self.to_json()).expect("serialized record must parse back")
    }
}

/// A reusable plan that can be materialized into an instance.
pub trait DataObjectTemplate: DataObjectBase {
    type Object: DataObjectBase;

    fn template_to_object(&self) -> Self::Object;
}

/// An instance that may remember the template it was created from.
pub trait DataObjectWithTemplate: DataObjectBase {
    type Template: DataObjectBase;

    /// Read-only view of the template snapshot, if any.
    fn template(&self) -> Option<&Self::Template>;

    /// Builds a fresh template from the current field values.
    fn extract_template(&self) -> Self::Template;
}

/// Loaded JSON does not match the expected record shape. Fatal to the load.
#[derive(Debug)]
pub struct DeserializationError {
    type_name: &'static str,
    source: serde_json::Error,
}

impl DeserializationError {
    fn new(type_name: &'static str, source: serde_json::Error) -> Self {
        Self { type_name, source }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Display for DeserializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} data: {}", self.type_name, self.source)
    }
}

impl Error for DeserializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Ordered element-wise equality.
pub(crate) fn lists_equal<T: HasEquals>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

pub(crate) fn trimmed_eq(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Validates each child against the children before it, which is enough to
/// catch every duplicate.
pub(crate) fn validate_children<T: DataObjectBase>(items: &[T]) -> Result<(), ValidationError> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(i, item)| item.validate(&items[..i]))
}

// serde field helpers

/// Optional keys accept absence or `null`, both meaning the default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn serialize_trimmed<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.trim())
}

/// Non-finite floats are written as `null`; read `null` back as NaN.
pub(crate) fn f64_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
