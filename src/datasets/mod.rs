//! Reference data: static tables loaded once at startup.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup reads every table from a local directory or an HTTP base URL
//! (a public bucket), validates it, and hands the result to `AppState` as
//! an `Arc<ReferenceData>`. Nothing mutates it afterwards.

pub mod encoder;
pub mod parse;
pub mod resale_index;

use std::path::PathBuf;

use serde::Serialize;

use crate::amenity::{AmenityCategory, AmenityTable};
use crate::geo::Coordinate;
use encoder::{TOWN_ENCODING_FILE, TownEncoder};
use resale_index::ResaleIndex;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {file}: {message}")]
    Read { file: String, message: String },
    #[error("{file} line {line}: {message}")]
    Csv { file: &'static str, line: usize, message: String },
    #[error("{file} line {line}: invalid latlong '{value}'")]
    InvalidLatLong { file: &'static str, line: usize, value: String },
    #[error("{0} has no usable rows")]
    EmptyTable(&'static str),
    #[error("town encoder: {0}")]
    Encoder(String),
}

// =============================================================================
// SOURCE
// =============================================================================

/// Where the reference tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Dir(PathBuf),
    Url(String),
}

impl DataSource {
    /// Read one file from the source as text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Read`] on I/O, network, or non-2xx failures.
    pub async fn read(&self, http: &reqwest::Client, file: &str) -> Result<String, DatasetError> {
        let read_err = |message: String| DatasetError::Read { file: file.to_owned(), message };
        match self {
            Self::Dir(dir) => tokio::fs::read_to_string(dir.join(file))
                .await
                .map_err(|e| read_err(e.to_string())),
            Self::Url(base) => {
                let url = format!("{}/{file}", base.trim_end_matches('/'));
                let response = http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| read_err(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(read_err(format!("status {}", status.as_u16())));
                }
                response.text().await.map_err(|e| read_err(e.to_string()))
            }
        }
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// A block of HDB flats, tagged with its town.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreetBlock {
    pub town: String,
    pub location: Coordinate,
}

/// Every static table the prediction flow reads.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub stations: AmenityTable,
    pub hawkers: AmenityTable,
    pub primary_schools: AmenityTable,
    pub secondary_schools: AmenityTable,
    pub street_blocks: Vec<StreetBlock>,
    pub resale_index: ResaleIndex,
    pub town_encoder: TownEncoder,
}

/// Raw file contents, one field per table.
pub struct ReferenceTexts {
    pub stations: String,
    pub hawkers: String,
    pub schools: String,
    pub street_blocks: String,
    pub resale_index: String,
    pub town_encoding: String,
}

impl ReferenceData {
    /// Load and validate every table from `source`.
    ///
    /// # Errors
    ///
    /// Returns the first [`DatasetError`] hit while reading or parsing.
    pub async fn load(source: &DataSource, http: &reqwest::Client) -> Result<Self, DatasetError> {
        let (stations, hawkers, schools, street_blocks, resale_index, town_encoding) = tokio::try_join!(
            source.read(http, parse::STATIONS_FILE),
            source.read(http, parse::HAWKERS_FILE),
            source.read(http, parse::SCHOOLS_FILE),
            source.read(http, parse::STREET_BLOCKS_FILE),
            source.read(http, parse::RESALE_INDEX_FILE),
            source.read(http, TOWN_ENCODING_FILE),
        )?;

        Self::from_texts(ReferenceTexts { stations, hawkers, schools, street_blocks, resale_index, town_encoding })
    }

    /// Parse and validate already-read tables.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] for malformed rows or empty tables.
    pub fn from_texts(texts: ReferenceTexts) -> Result<Self, DatasetError> {
        let stations = non_empty(parse::STATIONS_FILE, parse::parse_stations(&texts.stations)?)?;
        let hawkers = non_empty(parse::HAWKERS_FILE, parse::parse_hawkers(&texts.hawkers)?)?;
        let (primary, secondary) = parse::parse_schools(&texts.schools)?;
        let primary_schools = non_empty(parse::SCHOOLS_FILE, primary)?;
        let secondary_schools = non_empty(parse::SCHOOLS_FILE, secondary)?;
        let street_blocks = non_empty(parse::STREET_BLOCKS_FILE, parse::parse_street_blocks(&texts.street_blocks)?)?;

        let resale_index = ResaleIndex::parse(&texts.resale_index)?;
        if resale_index.is_empty() {
            return Err(DatasetError::EmptyTable(parse::RESALE_INDEX_FILE));
        }
        let town_encoder = TownEncoder::from_json(&texts.town_encoding)?;
        if town_encoder.is_empty() {
            return Err(DatasetError::EmptyTable(TOWN_ENCODING_FILE));
        }

        Ok(Self {
            stations: AmenityTable::new(stations),
            hawkers: AmenityTable::new(hawkers),
            primary_schools: AmenityTable::new(primary_schools),
            secondary_schools: AmenityTable::new(secondary_schools),
            street_blocks,
            resale_index,
            town_encoder,
        })
    }

    #[must_use]
    pub fn table(&self, category: AmenityCategory) -> &AmenityTable {
        match category {
            AmenityCategory::MrtStation => &self.stations,
            AmenityCategory::HawkerCentre => &self.hawkers,
            AmenityCategory::PrimarySchool => &self.primary_schools,
            AmenityCategory::SecondarySchool => &self.secondary_schools,
        }
    }

    /// Town of the nearest street block within `radius_km`.
    #[must_use]
    pub fn nearest_town(&self, origin: Coordinate, radius_km: f64) -> Option<&str> {
        self.street_blocks
            .iter()
            .map(|block| (block, origin.distance_km(&block.location)))
            .filter(|(_, d)| *d <= radius_km)
            // min_by keeps the first of equal elements.
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(block, _)| block.town.as_str())
    }
}

fn non_empty<T>(file: &'static str, rows: Vec<T>) -> Result<Vec<T>, DatasetError> {
    if rows.is_empty() {
        return Err(DatasetError::EmptyTable(file));
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
