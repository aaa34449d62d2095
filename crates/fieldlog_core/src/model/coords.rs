//! EPSG:4326 ("WGS 84") coordinates.
//!
//! Used by most GPS devices and online maps. Berlin is roughly `52.5,13.4`
//! in Lat,Lon order. Six decimal places resolve about 11 cm.
//!
//! # Invariants
//! - NaN components mean "not yet set"; `EMPTY_COORDS` has both unset.
//! - Valid coordinates are finite with lat in [-90, 90], lon in [-180, 180].

use crate::geo::{distance_bearing, DistanceBearing};
use crate::model::common::{f64_or_nan, DataObjectBase, HasEquals};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Decimal places used when rendering coordinates.
pub const WGS84_PRECISION: usize = 6;

/// Coordinates with both components unset.
pub const EMPTY_COORDS: Wgs84Coordinates = Wgs84Coordinates {
    wgs84lat: f64::NAN,
    wgs84lon: f64::NAN,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Wgs84Coordinates {
    #[serde(deserialize_with = "f64_or_nan")]
    pub wgs84lat: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub wgs84lon: f64,
}

impl Wgs84Coordinates {
    pub const fn new(wgs84lat: f64, wgs84lon: f64) -> Self {
        Self { wgs84lat, wgs84lon }
    }

    pub fn are_valid(&self) -> bool {
        self.wgs84lat.is_finite()
            && (-90.0..=90.0).contains(&self.wgs84lat)
            && self.wgs84lon.is_finite()
            && (-180.0..=180.0).contains(&self.wgs84lon)
    }

    /// Both components unset.
    pub fn is_unset(&self) -> bool {
        self.wgs84lat.is_nan() && self.wgs84lon.is_nan()
    }

    /// `"lat,lon"` with `WGS84_PRECISION` decimals.
    pub fn summary(&self) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            self.wgs84lat,
            self.wgs84lon,
            prec = WGS84_PRECISION
        )
    }

    pub fn distance_to(&self, other: &Self) -> DistanceBearing {
        distance_bearing(self, other)
    }
}

impl Default for Wgs84Coordinates {
    fn default() -> Self {
        EMPTY_COORDS
    }
}

impl PartialEq for Wgs84Coordinates {
    fn eq(&self, other: &Self) -> bool {
        same_number(self.wgs84lat, other.wgs84lat) && same_number(self.wgs84lon, other.wgs84lon)
    }
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl HasEquals for Wgs84Coordinates {
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl DataObjectBase for Wgs84Coordinates {
    const TYPE_NAME: &'static str = "coordinates";

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationError> {
        if !(self.wgs84lat.is_finite() && (-90.0..=90.0).contains(&self.wgs84lat)) {
            return Err(ValidationError::InvalidLatitude(self.wgs84lat));
        }
        if !(self.wgs84lon.is_finite() && (-180.0..=180.0).contains(&self.wgs84lon)) {
            return Err(ValidationError::InvalidLongitude(self.wgs84lon));
        }
        Ok(())
    }

    fn warnings_check(&self, _skip_init_warns: bool) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Wgs84Coordinates, EMPTY_COORDS};
    use crate::model::common::DataObjectBase;
    use crate::model::validation::ValidationError;
    use serde_json::json;

    #[test]
    fn validate_checks_ranges() {
        assert!(Wgs84Coordinates::new(90.0, -180.0).validate(&[]).is_ok());
        assert_eq!(
            Wgs84Coordinates::new(90.5, 0.0).validate(&[]).unwrap_err(),
            ValidationError::InvalidLatitude(90.5)
        );
        assert!(matches!(
            Wgs84Coordinates::new(0.0, f64::NAN).validate(&[]),
            Err(ValidationError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn unset_coordinates_round_trip_as_null() {
        let value = EMPTY_COORDS.to_json();
        assert_eq!(value, json!({ "wgs84lat": null, "wgs84lon": null }));
        let back = Wgs84Coordinates::from_json(value).unwrap();
        assert!(back.is_unset());
        assert_eq!(back, EMPTY_COORDS);
    }

    #[test]
    fn strict_keys_are_enforced() {
        let err = Wgs84Coordinates::from_json(json!({ "wgs84lat": 1.0 })).unwrap_err();
        assert_eq!(err.type_name(), "coordinates");
        assert!(Wgs84Coordinates::from_json(json!({ "wgs84lat": 1.0, "wgs84lon": 2.0, "alt": 3 }))
            .is_err());
    }

    #[test]
    fn summary_uses_six_decimals() {
        assert_eq!(Wgs84Coordinates::new(52.5, 13.4).summary(), "52.500000,13.400000");
    }
}
