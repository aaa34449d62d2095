//! Sampling locations: where samples are actually taken, and the planned
//! places they are taken from.
//!
//! # Invariants
//! - Location names are unique among siblings of the same trip or template.
//! - `actual_coords` may be unset; when set they must be valid.
//! - A location's template is a snapshot taken at creation time.

use crate::i18n::{tr, tr_with};
use crate::ids::now_millis;
use crate::model::common::{
    is_blank, lists_equal, nullable, serialize_trimmed, trimmed_eq, validate_children,
    DataObjectBase, DataObjectTemplate, DataObjectWithTemplate, HasEquals,
};
use crate::model::coords::{Wgs84Coordinates, EMPTY_COORDS};
use crate::model::sample::{Sample, SampleTemplate};
use crate::model::timestamp::{validate_timestamp, Timestamp, NO_TIMESTAMP};
use crate::model::validation::{list_warnings, validate_name, ValidationError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Drift between nominal and actual coordinates that triggers a warning.
pub const MAX_NOM_ACT_DIST_WARN_M: f64 = 200.0;

/// Records an actual sampling point.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SamplingLocation {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub short_desc: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Wgs84Coordinates::is_unset"
    )]
    pub actual_coords: Wgs84Coordinates,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub notes: String,
    pub samples: Vec<Sample>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub completed_tasks: Vec<String>,
    /// Photo references; the storage format is up to the host app.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<SamplingLocationTemplate>,
}

impl SamplingLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_desc: String::new(),
            actual_coords: EMPTY_COORDS,
            start_time: NO_TIMESTAMP,
            end_time: NO_TIMESTAMP,
            notes: String::new(),
            samples: Vec::new(),
            completed_tasks: Vec::new(),
            photos: Vec::new(),
            template: None,
        }
    }

    pub fn set_template(&mut self, template: Option<SamplingLocationTemplate>) {
        self.template = template;
    }

    /// Meters between the template's nominal and the actual coordinates.
    ///
    /// `None` without a template or when either side is not valid.
    pub fn nominal_drift_m(&self) -> Option<f64> {
        let nominal = &self.template.as_ref()?.nominal_coords;
        if !nominal.are_valid() || !self.actual_coords.are_valid() {
            return None;
        }
        Some(nominal.distance_to(&self.actual_coords).dist_km * 1000.0)
    }
}

impl HasEquals for SamplingLocation {
    fn equals(&self, other: &Self) -> bool {
        trimmed_eq(&self.name, &other.name)
            && trimmed_eq(&self.short_desc, &other.short_desc)
            && self.actual_coords == other.actual_coords
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && trimmed_eq(&self.notes, &other.notes)
            && lists_equal(&self.samples, &other.samples)
            && self.completed_tasks == other.completed_tasks
            && self.photos == other.photos
    }
}

impl DataObjectBase for SamplingLocation {
    const TYPE_NAME: &'static str = "sampling location";

    fn validate(&self, others: &[Self]) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if !self.actual_coords.is_unset() {
            self.actual_coords.validate(&[])?;
        }
        validate_timestamp(self.start_time)?;
        validate_timestamp(self.end_time)?;
        if others.iter().any(|o| o.name == self.name) {
            return Err(ValidationError::DuplicateName(self.name.clone()));
        }
        validate_children(&self.samples)
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
        if !skip_init_warns {
            if !self.end_time.is_set() {
                warnings.push(tr("no-end-time"));
            }
            if let Some(template) = &self.template {
                let open = template
                    .tasklist
                    .iter()
                    .filter(|task| !self.completed_tasks.contains(task))
                    .count();
                if open > 0 {
                    warnings.push(tr_with("tasks-not-completed", &[("count", open.to_string())]));
                }
            }
            if self.samples.is_empty() {
                warnings.push(tr("no-samples"));
            }
        }
        if let Some(dist) = self.nominal_drift_m().filter(|d| *d > MAX_NOM_ACT_DIST_WARN_M) {
            warnings.push(tr_with("coords-drift", &[("dist", format!("{dist:.0}"))]));
        }
        warnings.extend(list_warnings(&self.completed_tasks));
        warnings
    }
}

impl DataObjectWithTemplate for SamplingLocation {
    type Template = SamplingLocationTemplate;

    fn template(&self) -> Option<&SamplingLocationTemplate> {
        self.template.as_ref()
    }

    fn extract_template(&self) -> SamplingLocationTemplate {
        let nominal_coords = match &self.template {
            Some(t) if self.actual_coords.is_unset() => t.nominal_coords,
            _ => self.actual_coords,
        };
        SamplingLocationTemplate {
            name: self.name.trim().to_string(),
            short_desc: self.short_desc.trim().to_string(),
            instructions: self
                .template
                .as_ref()
                .map(|t| t.instructions.trim().to_string())
                .unwrap_or_default(),
            nominal_coords,
            samples: self.samples.iter().map(Sample::extract_template).collect(),
            tasklist: self
                .template
                .as_ref()
                .map(|t| t.tasklist.clone())
                .unwrap_or_default(),
        }
    }
}

/// A planned sampling point.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SamplingLocationTemplate {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub short_desc: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub instructions: String,
    pub nominal_coords: Wgs84Coordinates,
    /// Typical samples; when empty, a trip template's common samples apply.
    pub samples: Vec<SampleTemplate>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub tasklist: Vec<String>,
}

impl SamplingLocationTemplate {
    pub fn new(name: impl Into<String>, nominal_coords: Wgs84Coordinates) -> Self {
        Self {
            name: name.into(),
            short_desc: String::new(),
            instructions: String::new(),
            nominal_coords,
            samples: Vec::new(),
            tasklist: Vec::new(),
        }
    }
}

impl HasEquals for SamplingLocationTemplate {
    fn equals(&self, other: &Self) -> bool {
        trimmed_eq(&self.name, &other.name)
            && trimmed_eq(&self.short_desc, &other.short_desc)
            && trimmed_eq(&self.instructions, &other.instructions)
            && self.nominal_coords == other.nominal_coords
            && lists_equal(&self.samples, &other.samples)
            && self.tasklist == other.tasklist
    }
}

impl DataObjectBase for SamplingLocationTemplate {
    const TYPE_NAME: &'static str = "sampling location template";

    fn validate(&self, others: &[Self]) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        self.nominal_coords.validate(&[])?;
        if others.iter().any(|o| o.name == self.name) {
            return Err(ValidationError::DuplicateName(self.name.clone()));
        }
        validate_children(&self.samples)
    }

    fn warnings_check(&self, skip_init_warns: bool) -> Vec<String> {
        let mut warnings = list_warnings(&self.tasklist);
        if !skip_init_warns && self.samples.is_empty() {
            warnings.push(tr("no-samples"));
        }
        warnings
    }
}

impl DataObjectTemplate for SamplingLocationTemplate {
    type Object = SamplingLocation;

    fn template_to_object(&self) -> SamplingLocation {
        debug!("event=template_to_object module=model type=location samples={}", self.samples.len());
        SamplingLocation {
            name: self.name.clone(),
            short_desc: self.short_desc.clone(),
            actual_coords: self.nominal_coords,
            start_time: now_millis(),
            end_time: NO_TIMESTAMP,
            notes: String::new(),
            samples: Vec::new(),
            completed_tasks: Vec::new(),
            photos: Vec::new(),
            template: Some(self.deep_clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SamplingLocation, SamplingLocationTemplate};
    use crate::model::common::{
        DataObjectBase, DataObjectTemplate, DataObjectWithTemplate, HasEquals,
    };
    use crate::model::coords::Wgs84Coordinates;
    use crate::model::sample::{Sample, SampleTemplate, SampleType};
    use crate::model::timestamp::Timestamp;
    use crate::model::validation::ValidationError;
    use serde_json::json;

    fn planned() -> SamplingLocationTemplate {
        let mut t = SamplingLocationTemplate::new("Spree A", Wgs84Coordinates::new(52.5, 13.4));
        t.samples.push(SampleTemplate::new(SampleType::SurfaceWater));
        t.tasklist = vec!["Photo".to_string(), "Secchi".to_string()];
        t
    }

    #[test]
    fn template_to_object_copies_nominal_coords() {
        let loc = planned().template_to_object();
        assert_eq!(loc.name, "Spree A");
        assert_eq!(loc.actual_coords, Wgs84Coordinates::new(52.5, 13.4));
        assert!(loc.start_time.is_valid_and_set());
        assert!(loc.end_time.is_unset());
        assert!(loc.samples.is_empty());
        assert!(loc.template().expect("template set").equals(&planned()));
    }

    #[test]
    fn warnings_report_open_tasks_and_drift() {
        let mut loc = planned().template_to_object();
        loc.completed_tasks.push("Photo".to_string());
        // roughly 1.1 km north of the nominal point
        loc.actual_coords = Wgs84Coordinates::new(52.51, 13.4);
        let warnings = loc.warnings_check(false);
        assert!(warnings.iter().any(|w| w == "1 task(s) not completed"));
        assert!(warnings.iter().any(|w| w.starts_with("Actual coordinates are 1112 m")));
        assert!(warnings.iter().any(|w| w == "No samples"));

        let quiet = loc.warnings_check(true);
        assert!(!quiet.iter().any(|w| w == "No samples"));
        assert!(quiet.iter().any(|w| w.starts_with("Actual coordinates")));
    }

    #[test]
    fn end_before_start_warns() {
        let mut loc = SamplingLocation::new("X");
        loc.start_time = Timestamp::from_millis(2_000);
        loc.end_time = Timestamp::from_millis(1_000);
        assert!(loc.warnings_check(true).contains(&"End time is before start time".to_string()));
    }

    #[test]
    fn validate_rejects_duplicate_sibling_name() {
        let a = SamplingLocation::new("Pond");
        let b = SamplingLocation::new("Pond");
        assert_eq!(
            a.validate(&[b]).unwrap_err(),
            ValidationError::DuplicateName("Pond".to_string())
        );
        assert!(SamplingLocation::new("Pond").validate(&[]).is_ok());
    }

    #[test]
    fn template_requires_valid_nominal_coords() {
        let t = SamplingLocationTemplate::new("Lake", Wgs84Coordinates::new(91.0, 0.0));
        assert_eq!(t.validate(&[]).unwrap_err(), ValidationError::InvalidLatitude(91.0));
    }

    #[test]
    fn extract_template_keeps_tasklist_and_actual_coords() {
        let mut loc = planned().template_to_object();
        loc.actual_coords = Wgs84Coordinates::new(52.6, 13.5);
        loc.samples.push(Sample::new(SampleType::Sediment));
        let t = loc.extract_template();
        assert_eq!(t.nominal_coords, Wgs84Coordinates::new(52.6, 13.5));
        assert_eq!(t.tasklist, vec!["Photo".to_string(), "Secchi".to_string()]);
        assert_eq!(t.samples.len(), 1);
        assert_eq!(t.samples[0].kind, SampleType::Sediment);
    }

    #[test]
    fn json_omits_unset_coords_and_accepts_nulls() {
        let loc = SamplingLocation::from_json(json!({
            "name": "Ditch", "startTime": null, "endTime": null, "samples": [],
            "notes": null, "completedTasks": null, "photos": null
        }))
        .unwrap();
        assert!(loc.actual_coords.is_unset());
        assert_eq!(
            loc.to_json(),
            json!({ "name": "Ditch", "startTime": null, "endTime": null, "samples": [] })
        );
        assert!(SamplingLocation::from_json(json!({ "name": "Ditch", "samples": [] })).is_err());
    }
}
