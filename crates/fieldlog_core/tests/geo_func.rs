use fieldlog_core::{distance_bearing, Wgs84Coordinates};

const BRANDENBURG_GATE: Wgs84Coordinates = Wgs84Coordinates::new(52.516312, 13.377657);
const VICTORY_COLUMN: Wgs84Coordinates = Wgs84Coordinates::new(52.514556, 13.350120);

#[test]
fn berlin_fixture_distance_and_bearing() {
    let db = distance_bearing(&BRANDENBURG_GATE, &VICTORY_COLUMN);
    assert!((db.dist_km - 1.874).abs() < 0.005, "dist_km={}", db.dist_km);
    assert!((db.bearing_deg - 264.0).abs() < 0.1, "bearing_deg={}", db.bearing_deg);
}

#[test]
fn distance_is_symmetric_and_bearing_roughly_reverses() {
    let there = distance_bearing(&BRANDENBURG_GATE, &VICTORY_COLUMN);
    let back = distance_bearing(&VICTORY_COLUMN, &BRANDENBURG_GATE);
    assert!((there.dist_km - back.dist_km).abs() < 1e-12);
    let turn = (there.bearing_deg - back.bearing_deg).rem_euclid(360.0);
    assert!((turn - 180.0).abs() < 0.1, "turn={turn}");
}

#[test]
fn coords_method_matches_free_function() {
    let a = BRANDENBURG_GATE.distance_to(&VICTORY_COLUMN);
    let b = distance_bearing(&BRANDENBURG_GATE, &VICTORY_COLUMN);
    assert_eq!(a, b);
}
