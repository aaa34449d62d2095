//! Great-circle geometry between WGS84 coordinates.
//!
//! # Responsibility
//! - Compute haversine distance and initial compass bearing.
//!
//! # Invariants
//! - Inputs are not validated here; NaN or out-of-range coordinates yield NaN.
//! - Bearing is normalized into `[0, 360)` degrees.
//!
//! Formulas follow <https://www.movable-type.co.uk/scripts/latlong.html>.

use crate::model::coords::Wgs84Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance and initial bearing from one point to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceBearing {
    /// Great-circle distance in kilometers.
    pub dist_km: f64,
    /// Initial compass heading in degrees, `[0, 360)`.
    pub bearing_deg: f64,
}

/// Computes distance and initial bearing from `one` to `two`.
///
/// Identical points yield a distance of `0` and a bearing of `0`.
pub fn distance_bearing(one: &Wgs84Coordinates, two: &Wgs84Coordinates) -> DistanceBearing {
    let phi1 = one.wgs84lat.to_radians();
    let phi2 = two.wgs84lat.to_radians();
    let lambda1 = one.wgs84lon.to_radians();
    let lambda2 = two.wgs84lon.to_radians();
    let d_phi = (two.wgs84lat - one.wgs84lat).to_radians();
    let d_lambda = (two.wgs84lon - one.wgs84lon).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let dist_km = EARTH_RADIUS_KM * c;

    let y = (lambda2 - lambda1).sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * (lambda2 - lambda1).cos();
    let theta = y.atan2(x);
    let bearing_deg = (theta.to_degrees() + 360.0) % 360.0;

    DistanceBearing {
        dist_km,
        bearing_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::distance_bearing;
    use crate::model::coords::Wgs84Coordinates;

    #[test]
    fn identical_points_have_zero_distance() {
        let p = Wgs84Coordinates::new(52.5, 13.4);
        let result = distance_bearing(&p, &p);
        assert_eq!(result.dist_km, 0.0);
        assert_eq!(result.bearing_deg, 0.0);
    }

    #[test]
    fn due_east_on_equator_is_ninety_degrees() {
        let a = Wgs84Coordinates::new(0.0, 0.0);
        let b = Wgs84Coordinates::new(0.0, 1.0);
        let result = distance_bearing(&a, &b);
        assert!((result.bearing_deg - 90.0).abs() < 1e-9);
        assert!((result.dist_km - 111.195).abs() < 0.001);
    }

    #[test]
    fn nan_input_propagates() {
        let a = Wgs84Coordinates::new(f64::NAN, 0.0);
        let b = Wgs84Coordinates::new(0.0, 1.0);
        assert!(distance_bearing(&a, &b).dist_km.is_nan());
    }
}
