//! Samples and sample templates.
//!
//! # Invariants
//! - Measurements of a sample compare as a multiset; order is irrelevant.
//! - `Sample::template` is an owned snapshot, never updated automatically.

use crate::i18n::{tr, tr_with};
use crate::model::common::{
    is_blank, nullable, serialize_trimmed, trimmed_eq, DataObjectBase, DataObjectTemplate,
    DataObjectWithTemplate, HasEquals,
};
use crate::model::meas_type::{validate_measurement_types, Measurement, MeasurementType};
use crate::model::set::{data_sets_equal, deduplicated_set};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// What was sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleType {
    #[default]
    Undefined,
    SurfaceWater,
    SurfaceWaterStagnant,
    SurfaceWaterFlowing,
    GroundWater,
    WaterPrecipitation,
    Sediment,
    Soil,
    Vegetation,
    Organism,
    Fish,
    Insect,
    Other,
}

impl SampleType {
    /// Wire name, also used in CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::SurfaceWater => "surface-water",
            Self::SurfaceWaterStagnant => "surface-water-stagnant",
            Self::SurfaceWaterFlowing => "surface-water-flowing",
            Self::GroundWater => "ground-water",
            Self::WaterPrecipitation => "water-precipitation",
            Self::Sediment => "sediment",
            Self::Soil => "soil",
            Self::Vegetation => "vegetation",
            Self::Organism => "organism",
            Self::Fish => "fish",
            Self::Insect => "insect",
            Self::Other => "other",
        }
    }
}

/// Sampler's judgement of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectiveQuality {
    #[default]
    Undefined,
    Good,
    Questionable,
    Bad,
}

impl SubjectiveQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Good => "good",
            Self::Questionable => "questionable",
            Self::Bad => "bad",
        }
    }

    fn is_undefined(&self) -> bool {
        *self == Self::Undefined
    }
}

/// Records an actual sample taken.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Sample {
    #[serde(rename = "type")]
    pub kind: SampleType,
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
        skip_serializing_if = "SubjectiveQuality::is_undefined"
    )]
    pub subjective_quality: SubjectiveQuality,
    #[serde(
        default,
        deserialize_with = "nullable",
        serialize_with = "serialize_trimmed",
        skip_serializing_if = "is_blank"
    )]
    pub notes: String,
    pub measurements: Vec<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<SampleTemplate>,
}

impl Sample {
    pub fn new(kind: SampleType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Replaces the template snapshot.
    pub fn set_template(&mut self, template: Option<SampleTemplate>) {
        self.template = template;
    }
}

impl HasEquals for Sample {
    fn equals(&self, other: &Self) -> bool {
        self.kind == other.kind
            && trimmed_eq(&self.short_desc, &other.short_desc)
            && self.subjective_quality == other.subjective_quality
            && trimmed_eq(&self.notes, &other.notes)
            && data_sets_equal(&self.measurements, &other.measurements)
    }
}

impl DataObjectBase for Sample {
    const TYPE_NAME: &'static str = "sample";

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationError> {
        self.measurements
            .iter()
            .try_for_each(|measurement| measurement.validate(&[]))
    }

    fn warnings_check(&self, skip_init_warns: bool) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.kind == SampleType::Undefined {
            warnings.push(tr("samp-type-undef"));
        }
        if skip_init_warns {
            return warnings;
        }
        if self.subjective_quality.is_undefined() {
            warnings.push(tr("quality-undef"));
        }
        if self.measurements.is_empty() {
            warnings.push(tr("no-measurements"));
        }
        if let Some(template) = &self.template {
            let missing = template
                .measurement_types
                .iter()
                .filter(|t| !self.measurements.iter().any(|m| m.kind.equals(t)))
                .count();
            if missing > 0 {
                warnings.push(tr_with("meas-not-taken", &[("count", missing.to_string())]));
            }
        }
        warnings
    }
}

impl DataObjectWithTemplate for Sample {
    type Template = SampleTemplate;

    fn template(&self) -> Option<&SampleTemplate> {
        self.template.as_ref()
    }

    fn extract_template(&self) -> SampleTemplate {
        let types = deduplicated_set(self.measurements.iter().map(|m| &m.kind));
        SampleTemplate {
            kind: self.kind,
            short_desc: self.short_desc.trim().to_string(),
            instructions: self
                .template
                .as_ref()
                .map(|t| t.instructions.trim().to_string())
                .unwrap_or_default(),
            measurement_types: types.into_iter().map(DataObjectBase::deep_clone).collect(),
        }
    }
}

/// Describes a sample typically taken, and what is measured on it.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SampleTemplate {
    #[serde(rename = "type")]
    pub kind: SampleType,
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
    pub measurement_types: Vec<MeasurementType>,
}

impl SampleTemplate {
    pub fn new(kind: SampleType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

impl HasEquals for SampleTemplate {
    fn equals(&self, other: &Self) -> bool {
        self.kind == other.kind
            && trimmed_eq(&self.short_desc, &other.short_desc)
            && trimmed_eq(&self.instructions, &other.instructions)
            && data_sets_equal(&self.measurement_types, &other.measurement_types)
    }
}

impl DataObjectBase for SampleTemplate {
    const TYPE_NAME: &'static str = "sample template";

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationError> {
        validate_measurement_types(&self.measurement_types)
    }

    fn warnings_check(&self, _skip_init_warns: bool) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.kind == SampleType::Undefined {
            warnings.push(tr("samp-type-undef"));
        }
        warnings
    }
}

impl DataObjectTemplate for SampleTemplate {
    type Object = Sample;

    fn template_to_object(&self) -> Sample {
        Sample {
            kind: self.kind,
            short_desc: self.short_desc.clone(),
            subjective_quality: SubjectiveQuality::Undefined,
            notes: String::new(),
            measurements: Vec::new(),
            template: Some(self.deep_clone()),
        }
    }
}
