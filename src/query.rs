//! Query: one validated prediction request.
//!
//! A `Query` can only be built through [`Query::new`], so every instance
//! holds a location inside the service area and attributes within the
//! ranges the form offers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::geo::{BoundingBox, Coordinate, CoordinateError, SINGAPORE_BOUNDS};

pub const MIN_REMAINING_LEASE_YEARS: u32 = 20;
pub const MAX_REMAINING_LEASE_YEARS: u32 = 95;
pub const MIN_FLOOR_LEVEL: u32 = 1;
pub const MAX_FLOOR_LEVEL: u32 = 50;

/// Storeys per floor band used by the model.
const FLOOR_BAND_SIZE: u32 = 3;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("no location selected yet")]
    NoLocation,
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("location ({lat:.6}, {lng:.6}) is outside Singapore")]
    OutsideServiceArea { lat: f64, lng: f64 },
    #[error("unknown flat type '{0}'")]
    UnknownFlatType(String),
    #[error("remaining lease {0} years out of range [{MIN_REMAINING_LEASE_YEARS}, {MAX_REMAINING_LEASE_YEARS}]")]
    LeaseOutOfRange(u32),
    #[error("floor level {0} out of range [{MIN_FLOOR_LEVEL}, {MAX_FLOOR_LEVEL}]")]
    FloorOutOfRange(u32),
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

impl From<CoordinateError> for QueryError {
    fn from(err: CoordinateError) -> Self {
        Self::InvalidCoordinate(err.to_string())
    }
}

impl ErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoLocation => "E_NO_LOCATION",
            Self::InvalidCoordinate(_) => "E_INVALID_COORDINATE",
            Self::OutsideServiceArea { .. } => "E_OUTSIDE_SERVICE_AREA",
            Self::UnknownFlatType(_) => "E_UNKNOWN_FLAT_TYPE",
            Self::LeaseOutOfRange(_) => "E_LEASE_OUT_OF_RANGE",
            Self::FloorOutOfRange(_) => "E_FLOOR_OUT_OF_RANGE",
            Self::InvalidNumber { .. } => "E_INVALID_NUMBER",
        }
    }
}

// =============================================================================
// FLAT TYPE
// =============================================================================

/// HDB flat type offered by the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlatType {
    #[serde(rename = "1-room")]
    OneRoom,
    #[serde(rename = "2-room")]
    TwoRoom,
    #[serde(rename = "3-room")]
    ThreeRoom,
    #[serde(rename = "4-room")]
    #[default]
    FourRoom,
    #[serde(rename = "5-room")]
    FiveRoom,
}

impl FlatType {
    pub const ALL: [FlatType; 5] = [Self::OneRoom, Self::TwoRoom, Self::ThreeRoom, Self::FourRoom, Self::FiveRoom];

    #[must_use]
    pub fn rooms(self) -> u8 {
        match self {
            Self::OneRoom => 1,
            Self::TwoRoom => 2,
            Self::ThreeRoom => 3,
            Self::FourRoom => 4,
            Self::FiveRoom => 5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OneRoom => "1-room",
            Self::TwoRoom => "2-room",
            Self::ThreeRoom => "3-room",
            Self::FourRoom => "4-room",
            Self::FiveRoom => "5-room",
        }
    }
}

impl fmt::Display for FlatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlatType {
    type Err = QueryError;

    /// Accepts the form labels (`"4-room"`) and the HDB dataset spelling (`"4 ROOM"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.label() == normalized)
            .ok_or_else(|| QueryError::UnknownFlatType(s.to_owned()))
    }
}

// =============================================================================
// QUERY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    location: Coordinate,
    flat_type: FlatType,
    remaining_lease_years: u32,
    floor_level: u32,
}

impl Query {
    /// Validate and build a query against the Singapore service area.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] when the location lies outside Singapore or
    /// the lease or floor falls outside the form's ranges.
    pub fn new(
        location: Coordinate,
        flat_type: FlatType,
        remaining_lease_years: u32,
        floor_level: u32,
    ) -> Result<Self, QueryError> {
        Self::within(&SINGAPORE_BOUNDS, location, flat_type, remaining_lease_years, floor_level)
    }

    /// Validate against an explicit service area.
    ///
    /// # Errors
    ///
    /// See [`Query::new`].
    pub fn within(
        area: &BoundingBox,
        location: Coordinate,
        flat_type: FlatType,
        remaining_lease_years: u32,
        floor_level: u32,
    ) -> Result<Self, QueryError> {
        if !area.contains(location) {
            return Err(QueryError::OutsideServiceArea { lat: location.lat, lng: location.lng });
        }
        if !(MIN_REMAINING_LEASE_YEARS..=MAX_REMAINING_LEASE_YEARS).contains(&remaining_lease_years) {
            return Err(QueryError::LeaseOutOfRange(remaining_lease_years));
        }
        if !(MIN_FLOOR_LEVEL..=MAX_FLOOR_LEVEL).contains(&floor_level) {
            return Err(QueryError::FloorOutOfRange(floor_level));
        }
        Ok(Self { location, flat_type, remaining_lease_years, floor_level })
    }

    #[must_use]
    pub fn location(&self) -> Coordinate {
        self.location
    }

    #[must_use]
    pub fn flat_type(&self) -> FlatType {
        self.flat_type
    }

    #[must_use]
    pub fn remaining_lease_years(&self) -> u32 {
        self.remaining_lease_years
    }

    #[must_use]
    pub fn floor_level(&self) -> u32 {
        self.floor_level
    }

    /// Three-storey band the floor falls in (`floor / 3`).
    #[must_use]
    pub fn floor_band(&self) -> u32 {
        self.floor_level / FLOOR_BAND_SIZE
    }
}

/// Parse the map picker's latitude/longitude fields.
///
/// Blank or missing fields mean the user has not clicked the map yet.
///
/// # Errors
///
/// [`QueryError::NoLocation`] when either field is blank, otherwise
/// [`QueryError::InvalidCoordinate`] for unparseable or out-of-range values.
pub fn parse_location(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinate, QueryError> {
    let lat = lat.map(str::trim).filter(|v| !v.is_empty());
    let lng = lng.map(str::trim).filter(|v| !v.is_empty());
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(QueryError::NoLocation);
    };

    let lat = lat
        .parse::<f64>()
        .map_err(|_| QueryError::InvalidCoordinate(format!("latitude '{lat}'")))?;
    let lng = lng
        .parse::<f64>()
        .map_err(|_| QueryError::InvalidCoordinate(format!("longitude '{lng}'")))?;
    Ok(Coordinate::new(lat, lng)?)
}

/// Parse a slider field, falling back to `default` when it is blank or absent.
///
/// # Errors
///
/// [`QueryError::InvalidNumber`] when the field is not a non-negative integer.
pub fn parse_whole_number(field: &'static str, value: Option<&str>, default: u32) -> Result<u32, QueryError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| QueryError::InvalidNumber { field, value: raw.to_owned() }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
