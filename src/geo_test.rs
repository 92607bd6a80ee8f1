use super::*;

fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

// =========================================================================
// Coordinate
// =========================================================================

#[test]
fn coordinate_rejects_non_finite() {
    assert_eq!(Coordinate::new(f64::NAN, 103.8), Err(CoordinateError::NotFinite));
    assert_eq!(Coordinate::new(1.3, f64::INFINITY), Err(CoordinateError::NotFinite));
}

#[test]
fn coordinate_rejects_out_of_range() {
    assert_eq!(Coordinate::new(91.0, 0.0), Err(CoordinateError::LatitudeOutOfRange(91.0)));
    assert_eq!(Coordinate::new(0.0, -181.0), Err(CoordinateError::LongitudeOutOfRange(-181.0)));
}

#[test]
fn coordinate_accepts_extremes() {
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
    assert!(Coordinate::new(90.0, -180.0).is_ok());
}

// =========================================================================
// BoundingBox
// =========================================================================

#[test]
fn singapore_bounds_contains_city_centre() {
    assert!(SINGAPORE_BOUNDS.contains(SINGAPORE_CENTER));
    assert!(SINGAPORE_BOUNDS.contains(coord(1.2840, 103.8515)));
}

#[test]
fn singapore_bounds_excludes_null_island_and_johor() {
    assert!(!SINGAPORE_BOUNDS.contains(coord(0.0, 0.0)));
    assert!(!SINGAPORE_BOUNDS.contains(coord(1.4927, 103.7414)));
}

#[test]
fn bounding_box_edges_are_inclusive() {
    assert!(SINGAPORE_BOUNDS.contains(coord(1.15, 103.6)));
    assert!(SINGAPORE_BOUNDS.contains(coord(1.45, 104.0)));
}

#[test]
fn bounding_box_from_tilejson_requires_four_values() {
    assert_eq!(BoundingBox::from_tilejson(&[103.6, 1.15, 104.0, 1.45]), Some(SINGAPORE_BOUNDS));
    assert_eq!(BoundingBox::from_tilejson(&[103.6, 1.15]), None);
}

// =========================================================================
// Distance
// =========================================================================

#[test]
fn distance_to_self_is_zero() {
    let p = coord(1.3700, 103.8496);
    assert!(p.distance_km(&p).abs() < f64::EPSILON);
}

#[test]
fn distance_is_symmetric() {
    let a = coord(1.3700, 103.8496);
    let b = coord(1.3508, 103.8483);
    assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
}

#[test]
fn one_degree_of_longitude_on_equator() {
    // 111.319 km on the WGS-84 ellipsoid.
    let d = geodesic_km(coord(0.0, 0.0), coord(0.0, 1.0));
    assert!((d - 111.319_49).abs() < 0.001, "got {d}");
}

#[test]
fn one_degree_of_latitude_near_equator() {
    let d = geodesic_km(coord(0.0, 0.0), coord(1.0, 0.0));
    assert!((d - 110.574).abs() < 0.01, "got {d}");
}

#[test]
fn ang_mo_kio_to_bishan_is_about_two_kilometres() {
    let d = geodesic_km(coord(1.3700, 103.8496), coord(1.3508, 103.8483));
    assert!(d > 2.0 && d < 2.3, "got {d}");
}

#[test]
fn null_island_to_singapore_is_far() {
    let d = geodesic_km(coord(0.0, 0.0), SINGAPORE_CENTER);
    assert!(d > 11_000.0 && d < 12_000.0, "got {d}");
}

#[test]
fn antipodal_points_fall_back_to_haversine() {
    let a = coord(0.0, 0.0);
    let b = coord(0.5, 179.7);
    let d = geodesic_km(a, b);
    assert!(d.is_finite());
    assert!(d > 19_000.0 && d < 20_100.0, "got {d}");
}

#[test]
fn haversine_agrees_with_vincenty_at_city_scale() {
    let a = coord(1.3700, 103.8496);
    let b = coord(1.3327, 103.8474);
    let exact = geodesic_km(a, b);
    let relative = (haversine_km(a, b) - exact).abs() / exact;
    assert!(relative < 0.01, "relative error {relative}");
}

#[test]
fn round_km_keeps_one_decimal() {
    assert!((round_km(1.26) - 1.3).abs() < 1e-12);
    assert!((round_km(0.04) - 0.0).abs() < 1e-12);
}
