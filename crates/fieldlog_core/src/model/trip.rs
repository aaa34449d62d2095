//! Sampling trips and trip templates.
//!
//! # Responsibility
//! - Hold the top-level records that own locations and samples.
//! - Expand a template's common samples into its locations on
//!   instantiation, and hoist shared samples back when extracting.
//!
//! # Invariants
//! - `id` is opaque and immutable after construction.
//! - `last_modified` is always set after loading.
//! - A trip's `template` snapshot has no common samples: they were moved
//!   into the snapshot's locations when the trip was created.

use crate::i18n::{tr, tr_with};
use crate::ids::{allocate_id, now_millis, IdKind};
use crate::model::common::{
    is_blank, lists_equal, nullable, serialize_trimmed, trimmed_eq, validate_children,
    DataObjectBase, DataObjectTemplate, DataObjectWithTemplate, HasEquals,
};
use crate::model::location::{SamplingLocation, SamplingLocationTemplate};
use crate::model::sample::SampleTemplate;
use crate::model::set::data_sets_equal;
use crate::model::timestamp::{validate_timestamp, Timestamp, NO_TIMESTAMP};
use crate::model::validation::{list_warnings, validate_id, validate_name, ValidationError};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

/// Records an actual sampling trip.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SamplingTrip {
    id: String,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(
        default = "now_millis",
        deserialize_with = "timestamp_or_now",
        skip_serializing_if = "Timestamp::is_unset"
    )]
    pub last_modified: Timestamp,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub persons: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub weather: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub notes: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub checked_tasks: Vec<String>,
    pub locations: Vec<SamplingLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<SamplingTripTemplate>,
}

/// `lastModified` falls back to "now" when missing, `null` or unset.
fn timestamp_or_now<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let value = Timestamp::deserialize(deserializer)?;
    Ok(if value.is_set() { value } else { now_millis() })
}

impl SamplingTrip {
    /// Empty trip with a freshly allocated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: allocate_id(IdKind::Trip),
            name: name.into(),
            start_time: NO_TIMESTAMP,
            end_time: NO_TIMESTAMP,
            last_modified: now_millis(),
            persons: String::new(),
            weather: String::new(),
            notes: String::new(),
            checked_tasks: Vec::new(),
            locations: Vec::new(),
            template: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_template(&mut self, template: Option<SamplingTripTemplate>) {
        self.template = template;
    }

    /// Human-facing key, `name [YYYY-MM-DD]` by UTC start date, or the bare
    /// name when the trip has no usable start time.
    pub fn trip_key(&self) -> String {
        let name = if self.name.trim().is_empty() {
            "?"
        } else {
            self.name.as_str()
        };
        match self.start_time.to_date_string() {
            Some(date) => format!("{name} [{date}]"),
            None => name.to_string(),
        }
    }

    /// Marks the trip as modified now.
    pub fn touch(&mut self) {
        self.last_modified = now_millis();
    }
}

impl HasEquals for SamplingTrip {
    fn equals(&self, other: &Self) -> bool {
        trimmed_eq(&self.name, &other.name)
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && trimmed_eq(&self.persons, &other.persons)
            && trimmed_eq(&self.weather, &other.weather)
            && trimmed_eq(&self.notes, &other.notes)
            && self.checked_tasks == other.checked_tasks
            && lists_equal(&self.locations, &other.locations)
    }
}

impl DataObjectBase for SamplingTrip {
    const TYPE_NAME: &'static str = "sampling trip";

    fn validate(&self, others: &[Self]) -> Result<(), ValidationError> {
        validate_id(&self.id)?;
        validate_name(&self.name)?;
        validate_timestamp(self.start_time)?;
        validate_timestamp(self.end_time)?;
        validate_timestamp(self.last_modified)?;
        if others.iter().any(|o| o.id == self.id) {
            return Err(ValidationError::DuplicateId(self.id.clone()));
        }
        let key = self.trip_key();
        if others.iter().any(|o| o.trip_key() == key) {
            return Err(ValidationError::DuplicateName(key));
        }
        validate_children(&self.locations)
    }

    fn warnings_check(&self, skip_init_warns: bool) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.start_time.is_set() {
            warnings.push(tr("no-start-time"));
        }
        if let (Some(start), Some(end)) = (self.start_time.millis(), self.end_time.millis()) {
            if end < start {
                warnings.push(tr("times-order"));
            }
        }
        if skip_init_warns {
            return warnings;
        }
        if !self.end_time.is_set() {
            warnings.push(tr("no-end-time"));
        }
        match &self.template {
            Some(template) => {
                let unchecked = template
                    .checklist
                    .iter()
                    .filter(|item| !self.checked_tasks.contains(item))
                    .count();
                if unchecked > 0 {
                    warnings.push(tr_with(
                        "check-not-completed",
                        &[("count", unchecked.to_string())],
                    ));
                }
                let remaining = template
                    .locations
                    .iter()
                    .filter(|planned| !self.locations.iter().any(|l| l.name == planned.name))
                    .count();
                if remaining > 0 {
                    warnings.push(tr_with(
                        "planned-loc-remain",
                        &[("count", remaining.to_string())],
                    ));
                }
            }
            None if self.locations.is_empty() => warnings.push(tr("no-locations")),
            None => {}
        }
        warnings
    }
}

impl DataObjectWithTemplate for SamplingTrip {
    type Template = SamplingTripTemplate;

    fn template(&self) -> Option<&SamplingTripTemplate> {
        self.template.as_ref()
    }

    fn extract_template(&self) -> SamplingTripTemplate {
        let mut locations: Vec<SamplingLocationTemplate> = self
            .locations
            .iter()
            .map(SamplingLocation::extract_template)
            .collect();
        let hoist = match locations.split_first() {
            Some((first, rest)) => rest
                .iter()
                .all(|loc| data_sets_equal(&first.samples, &loc.samples)),
            None => false,
        };
        let common_samples = if hoist {
            let common = std::mem::take(&mut locations[0].samples);
            for loc in &mut locations[1..] {
                loc.samples.clear();
            }
            common
        } else {
            Vec::new()
        };
        debug!(
            "event=extract_template module=model type=trip locations={} hoisted={}",
            locations.len(),
            hoist
        );
        SamplingTripTemplate {
            id: allocate_id(IdKind::Template),
            name: self.name.trim().to_string(),
            description: self
                .template
                .as_ref()
                .map(|t| t.description.trim().to_string())
                .unwrap_or_default(),
            checklist: self
                .template
                .as_ref()
                .map(|t| t.checklist.clone())
                .unwrap_or_default(),
            locations,
            common_samples,
        }
    }
}

/// A reusable plan for a sampling trip.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SamplingTripTemplate {
    id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub description: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<String>,
    pub locations: Vec<SamplingLocationTemplate>,
    /// Applied to every location template whose own `samples` is empty.
    pub common_samples: Vec<SampleTemplate>,
}

impl SamplingTripTemplate {
    /// Empty template with a freshly allocated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: allocate_id(IdKind::Template),
            name: name.into(),
            description: String::new(),
            checklist: Vec::new(),
            locations: Vec::new(),
            common_samples: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl HasEquals for SamplingTripTemplate {
    fn equals(&self, other: &Self) -> bool {
        trimmed_eq(&self.name, &other.name)
            && trimmed_eq(&self.description, &other.description)
            && self.checklist == other.checklist
            && lists_equal(&self.locations, &other.locations)
            && lists_equal(&self.common_samples, &other.common_samples)
    }
}

impl DataObjectBase for SamplingTripTemplate {
    const TYPE_NAME: &'static str = "sampling trip template";

    fn validate(&self, others: &[Self]) -> Result<(), ValidationError> {
        validate_id(&self.id)?;
        validate_name(&self.name)?;
        if others.iter().any(|o| o.id == self.id) {
            return Err(ValidationError::DuplicateId(self.id.clone()));
        }
        if others.iter().any(|o| o.name == self.name) {
            return Err(ValidationError::DuplicateName(self.name.clone()));
        }
        validate_children(&self.locations)?;
        validate_children(&self.common_samples)
    }

    fn warnings_check(&self, skip_init_warns: bool) -> Vec<String> {
        let mut warnings = list_warnings(&self.checklist);
        if !skip_init_warns && self.locations.is_empty() {
            warnings.push(tr("no-locations"));
        }
        warnings
    }
}

impl DataObjectTemplate for SamplingTripTemplate {
    type Object = SamplingTrip;

    fn template_to_object(&self) -> SamplingTrip {
        let mut snapshot = self.deep_clone();
        let common = std::mem::take(&mut snapshot.common_samples);
        for loc in snapshot.locations.iter_mut().filter(|l| l.samples.is_empty()) {
            loc.samples
                .extend(common.iter().map(DataObjectBase::deep_clone));
        }
        debug!(
            "event=template_to_object module=model type=trip locations={} common_samples={}",
            snapshot.locations.len(),
            common.len()
        );
        let now = now_millis();
        SamplingTrip {
            id: allocate_id(IdKind::Trip),
            name: self.name.clone(),
            start_time: now,
            end_time: NO_TIMESTAMP,
            last_modified: now,
            persons: String::new(),
            weather: String::new(),
            notes: String::new(),
            checked_tasks: Vec::new(),
            locations: Vec::new(),
            template: Some(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SamplingTrip, SamplingTripTemplate};
    use crate::model::common::{DataObjectBase, DataObjectTemplate, DataObjectWithTemplate};
    use crate::model::timestamp::Timestamp;
    use crate::model::validation::ValidationError;
    use serde_json::json;

    #[test]
    fn trip_key_uses_utc_start_date() {
        let mut trip = SamplingTrip::new("Spree");
        assert_eq!(trip.trip_key(), "Spree");
        trip.start_time = Timestamp::from_millis(1_735_786_980_000);
        assert_eq!(trip.trip_key(), "Spree [2025-01-02]");
    }

    #[test]
    fn validate_rejects_same_key_with_different_id() {
        let mut a = SamplingTrip::new("Spree");
        a.start_time = Timestamp::from_millis(1_735_786_980_000);
        let mut b = SamplingTrip::new("Spree");
        b.start_time = Timestamp::from_millis(1_735_790_000_000);
        assert_eq!(
            a.validate(&[b]).unwrap_err(),
            ValidationError::DuplicateName("Spree [2025-01-02]".to_string())
        );
    }

    #[test]
    fn missing_or_null_last_modified_defaults_to_now() {
        for value in [
            json!({ "id": "t1", "name": "A", "startTime": null, "endTime": null, "locations": [] }),
            json!({ "id": "t1", "name": "A", "startTime": null, "endTime": null, "locations": [],
                    "lastModified": null }),
        ] {
            let trip = SamplingTrip::from_json(value).unwrap();
            assert_eq!(trip.id(), "t1");
            assert!(trip.last_modified.is_valid_and_set());
        }
    }

    #[test]
    fn warnings_without_template_report_no_locations() {
        let trip = SamplingTrip::new("A");
        let warnings = trip.warnings_check(false);
        assert!(warnings.contains(&"No start time".to_string()));
        assert!(warnings.contains(&"No sampling locations".to_string()));
        assert_eq!(trip.warnings_check(true), vec!["No start time".to_string()]);
    }

    #[test]
    fn template_to_object_stamps_times_and_new_id() {
        let mut t = SamplingTripTemplate::new("Plan");
        t.checklist = vec!["Boots".to_string()];
        let trip = t.template_to_object();
        assert_ne!(trip.id(), t.id());
        assert!(trip.start_time.is_valid_and_set());
        assert_eq!(trip.start_time, trip.last_modified);
        assert!(trip.locations.is_empty());
        assert_eq!(trip.template().expect("template set").id(), t.id());
        assert!(trip
            .warnings_check(false)
            .contains(&"1 checklist item(s) not completed".to_string()));
    }

    #[test]
    fn template_validate_rejects_duplicate_name() {
        let a = SamplingTripTemplate::new("Plan");
        let b = SamplingTripTemplate::new("Plan");
        assert_eq!(
            a.validate(&[b]).unwrap_err(),
            ValidationError::DuplicateName("Plan".to_string())
        );
    }
}
