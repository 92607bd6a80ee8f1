use super::*;

fn amk() -> Coordinate {
    Coordinate::new(1.3700, 103.8496).unwrap()
}

// =========================================================================
// FlatType
// =========================================================================

#[test]
fn flat_type_parses_form_labels() {
    assert_eq!("1-room".parse::<FlatType>(), Ok(FlatType::OneRoom));
    assert_eq!("5-room".parse::<FlatType>(), Ok(FlatType::FiveRoom));
}

#[test]
fn flat_type_parses_dataset_spelling() {
    assert_eq!("4 ROOM".parse::<FlatType>(), Ok(FlatType::FourRoom));
    assert_eq!(" 3-Room ".parse::<FlatType>(), Ok(FlatType::ThreeRoom));
}

#[test]
fn flat_type_rejects_executive() {
    assert_eq!(
        "executive".parse::<FlatType>(),
        Err(QueryError::UnknownFlatType("executive".into()))
    );
}

#[test]
fn flat_type_rooms_match_label_digit() {
    for t in FlatType::ALL {
        let digit = t.label().chars().next().unwrap().to_digit(10).unwrap();
        assert_eq!(u32::from(t.rooms()), digit);
    }
}

#[test]
fn flat_type_defaults_to_four_room() {
    assert_eq!(FlatType::default(), FlatType::FourRoom);
}

#[test]
fn flat_type_serde_uses_labels() {
    assert_eq!(serde_json::to_string(&FlatType::TwoRoom).unwrap(), "\"2-room\"");
    let parsed: FlatType = serde_json::from_str("\"3-room\"").unwrap();
    assert_eq!(parsed, FlatType::ThreeRoom);
}

// =========================================================================
// Query
// =========================================================================

#[test]
fn query_accepts_form_bounds() {
    assert!(Query::new(amk(), FlatType::OneRoom, 20, 1).is_ok());
    assert!(Query::new(amk(), FlatType::FiveRoom, 95, 50).is_ok());
}

#[test]
fn query_rejects_lease_out_of_range() {
    assert_eq!(Query::new(amk(), FlatType::FourRoom, 19, 10), Err(QueryError::LeaseOutOfRange(19)));
    assert_eq!(Query::new(amk(), FlatType::FourRoom, 96, 10), Err(QueryError::LeaseOutOfRange(96)));
}

#[test]
fn query_rejects_floor_out_of_range() {
    assert_eq!(Query::new(amk(), FlatType::FourRoom, 90, 0), Err(QueryError::FloorOutOfRange(0)));
    assert_eq!(Query::new(amk(), FlatType::FourRoom, 90, 51), Err(QueryError::FloorOutOfRange(51)));
}

#[test]
fn query_rejects_null_island() {
    let origin = Coordinate::new(0.0, 0.0).unwrap();
    assert_eq!(
        Query::new(origin, FlatType::FourRoom, 90, 10),
        Err(QueryError::OutsideServiceArea { lat: 0.0, lng: 0.0 })
    );
}

#[test]
fn query_within_custom_area() {
    let area = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
    let origin = Coordinate::new(0.0, 0.0).unwrap();
    assert!(Query::within(&area, origin, FlatType::FourRoom, 90, 10).is_ok());
    assert!(Query::within(&area, amk(), FlatType::FourRoom, 90, 10).is_err());
}

#[test]
fn floor_band_is_floor_div_three() {
    let band = |floor| Query::new(amk(), FlatType::FourRoom, 90, floor).unwrap().floor_band();
    assert_eq!(band(1), 0);
    assert_eq!(band(3), 1);
    assert_eq!(band(10), 3);
    assert_eq!(band(50), 16);
}

#[test]
fn query_accessors_return_inputs() {
    let q = Query::new(amk(), FlatType::ThreeRoom, 75, 12).unwrap();
    assert_eq!(q.location(), amk());
    assert_eq!(q.flat_type(), FlatType::ThreeRoom);
    assert_eq!(q.remaining_lease_years(), 75);
    assert_eq!(q.floor_level(), 12);
}

// =========================================================================
// parse_location
// =========================================================================

#[test]
fn parse_location_blank_means_no_location() {
    assert_eq!(parse_location(None, None), Err(QueryError::NoLocation));
    assert_eq!(parse_location(Some(""), Some("103.8")), Err(QueryError::NoLocation));
    assert_eq!(parse_location(Some("1.3"), Some("   ")), Err(QueryError::NoLocation));
}

#[test]
fn parse_location_parses_numbers() {
    let c = parse_location(Some(" 1.370000 "), Some("103.849600")).unwrap();
    assert!((c.lat - 1.37).abs() < 1e-12);
    assert!((c.lng - 103.8496).abs() < 1e-12);
}

#[test]
fn parse_location_rejects_garbage_and_nan() {
    assert!(matches!(parse_location(Some("abc"), Some("103.8")), Err(QueryError::InvalidCoordinate(_))));
    assert!(matches!(parse_location(Some("NaN"), Some("103.8")), Err(QueryError::InvalidCoordinate(_))));
    assert!(matches!(parse_location(Some("95"), Some("103.8")), Err(QueryError::InvalidCoordinate(_))));
}

#[test]
fn parse_whole_number_defaults_when_blank() {
    assert_eq!(parse_whole_number("floor_level", None, 10), Ok(10));
    assert_eq!(parse_whole_number("floor_level", Some("  "), 10), Ok(10));
    assert_eq!(parse_whole_number("floor_level", Some(" 42 "), 10), Ok(42));
}

#[test]
fn parse_whole_number_rejects_fractions_and_text() {
    assert_eq!(
        parse_whole_number("remaining_lease_years", Some("90.5"), 90),
        Err(QueryError::InvalidNumber { field: "remaining_lease_years", value: "90.5".into() })
    );
    assert!(matches!(parse_whole_number("floor_level", Some("-3"), 10), Err(QueryError::InvalidNumber { .. })));
}

#[test]
fn error_codes_are_distinct() {
    use crate::error::ErrorCode;
    assert_eq!(QueryError::NoLocation.error_code(), "E_NO_LOCATION");
    assert_eq!(QueryError::OutsideServiceArea { lat: 0.0, lng: 0.0 }.error_code(), "E_OUTSIDE_SERVICE_AREA");
    assert!(!QueryError::NoLocation.retryable());
}
