//! Core data model for recording field sampling trips.
//! Templates plan trips; instances record what was actually sampled.

pub mod export;
pub mod geo;
pub mod i18n;
pub mod ids;
pub mod import;
pub mod logging;
pub mod model;

pub use export::trip_csv::{trip_to_csv, CsvFile, MAX_NOM_ACT_DIST_CSV_M};
pub use geo::{distance_bearing, DistanceBearing};
pub use import::wtw::{WtwReceiver, WtwRecord};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::common::{
    DataObjectBase, DataObjectTemplate, DataObjectWithTemplate, DeserializationError, HasEquals,
};
pub use model::coords::{Wgs84Coordinates, EMPTY_COORDS, WGS84_PRECISION};
pub use model::location::{SamplingLocation, SamplingLocationTemplate, MAX_NOM_ACT_DIST_WARN_M};
pub use model::meas_type::{Measurement, MeasurementType};
pub use model::sample::{Sample, SampleTemplate, SampleType, SubjectiveQuality};
pub use model::set::{data_sets_equal, deduplicated_set, set_remove};
pub use model::timestamp::{Timestamp, MAX_TIMESTAMP, NO_TIMESTAMP};
pub use model::trip::{SamplingTrip, SamplingTripTemplate};
pub use model::validation::{is_valid_name, ValidationError, VALID_NAME_PATTERN};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
