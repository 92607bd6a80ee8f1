//! CSV row parsing for the reference tables.
//!
//! Every table stores locations in a `latlong` column holding a tuple
//! string such as `"(1.3700, 103.8496)"`. Extra columns are ignored.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{DatasetError, StreetBlock};
use crate::amenity::{AmenityCategory, AmenityPoint};
use crate::geo::Coordinate;

pub const STATIONS_FILE: &str = "train_stations.csv";
pub const HAWKERS_FILE: &str = "hawker_markets.csv";
pub const SCHOOLS_FILE: &str = "schools.csv";
pub const STREET_BLOCKS_FILE: &str = "street_blocks.csv";
pub const RESALE_INDEX_FILE: &str = "resale_index.csv";

#[derive(Deserialize)]
struct StationRow {
    mrt_station_english: String,
    latlong: String,
}

#[derive(Deserialize)]
struct HawkerRow {
    name: String,
    latlong: String,
}

#[derive(Deserialize)]
struct SchoolRow {
    school_name: String,
    mainlevel_code: String,
    latlong: String,
}

#[derive(Deserialize)]
struct StreetBlockRow {
    town: String,
    latlong: String,
}

#[derive(Deserialize)]
pub(super) struct ResaleIndexRow {
    pub quarter: String,
    pub index: f64,
}

/// Parse a `"(lat, lng)"` tuple string. Parentheses or brackets are optional.
#[must_use]
pub fn parse_latlong(raw: &str) -> Option<Coordinate> {
    let inner = raw
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);
    let (lat, lng) = inner.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lng).ok()
}

/// Deserialize all rows of `text`, tagging each with its 1-based line number.
fn read_rows<T: DeserializeOwned>(file: &'static str, text: &str) -> Result<Vec<(usize, T)>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(i, row)| {
            // Line 1 is the header.
            let line = i + 2;
            row.map(|r| (line, r))
                .map_err(|e| DatasetError::Csv { file, line, message: e.to_string() })
        })
        .collect()
}

fn location(file: &'static str, line: usize, raw: &str) -> Result<Coordinate, DatasetError> {
    parse_latlong(raw).ok_or_else(|| DatasetError::InvalidLatLong { file, line, value: raw.to_owned() })
}

/// # Errors
///
/// Returns a [`DatasetError`] naming the first malformed row.
pub fn parse_stations(text: &str) -> Result<Vec<AmenityPoint>, DatasetError> {
    read_rows::<StationRow>(STATIONS_FILE, text)?
        .into_iter()
        .map(|(line, row)| {
            Ok(AmenityPoint {
                location: location(STATIONS_FILE, line, &row.latlong)?,
                name: row.mrt_station_english,
                category: AmenityCategory::MrtStation,
            })
        })
        .collect()
}

/// # Errors
///
/// Returns a [`DatasetError`] naming the first malformed row.
pub fn parse_hawkers(text: &str) -> Result<Vec<AmenityPoint>, DatasetError> {
    read_rows::<HawkerRow>(HAWKERS_FILE, text)?
        .into_iter()
        .map(|(line, row)| {
            Ok(AmenityPoint {
                location: location(HAWKERS_FILE, line, &row.latlong)?,
                name: row.name,
                category: AmenityCategory::HawkerCentre,
            })
        })
        .collect()
}

/// Parse the schools table, split into primary and secondary schools.
///
/// Rows with any other `mainlevel_code` (junior colleges, mixed levels) are skipped.
///
/// # Errors
///
/// Returns a [`DatasetError`] naming the first malformed row.
pub fn parse_schools(text: &str) -> Result<(Vec<AmenityPoint>, Vec<AmenityPoint>), DatasetError> {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();

    for (line, row) in read_rows::<SchoolRow>(SCHOOLS_FILE, text)? {
        let category = match row.mainlevel_code.to_ascii_uppercase().as_str() {
            "PRIMARY" => AmenityCategory::PrimarySchool,
            "SECONDARY" => AmenityCategory::SecondarySchool,
            _ => continue,
        };
        let point =
            AmenityPoint { location: location(SCHOOLS_FILE, line, &row.latlong)?, name: row.school_name, category };
        match category {
            AmenityCategory::PrimarySchool => primary.push(point),
            _ => secondary.push(point),
        }
    }

    Ok((primary, secondary))
}

/// # Errors
///
/// Returns a [`DatasetError`] naming the first malformed row.
pub fn parse_street_blocks(text: &str) -> Result<Vec<StreetBlock>, DatasetError> {
    read_rows::<StreetBlockRow>(STREET_BLOCKS_FILE, text)?
        .into_iter()
        .map(|(line, row)| {
            Ok(StreetBlock {
                location: location(STREET_BLOCKS_FILE, line, &row.latlong)?,
                town: row.town.to_ascii_uppercase(),
            })
        })
        .collect()
}

pub(super) fn parse_resale_index_rows(text: &str) -> Result<Vec<(usize, ResaleIndexRow)>, DatasetError> {
    read_rows(RESALE_INDEX_FILE, text)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
