//! Prediction service: query in, price and nearby amenities out.
//!
//! DESIGN
//! ======
//! The flow is strictly linear: look up every amenity table around the
//! query point, resolve the town from the nearest street block, read the
//! resale index for the current quarter, assemble the model's feature
//! vector, and call the predictor once.
//!
//! ERROR HANDLING
//! ==============
//! A predictor failure ends the request. Nothing here retries; the caller
//! decides how to present the error.

use serde::Serialize;

use crate::amenity::{AmenityCategory, NearbyAmenity, NearbySummary, merge_by_distance};
use crate::config::{DEFAULT_AMENITY_RADIUS_KM, DEFAULT_TOWN_RADIUS_KM};
use crate::datasets::ReferenceData;
use crate::datasets::resale_index::Quarter;
use crate::error::ErrorCode;
use crate::predictor::{PredictError, PricePredictor};
use crate::query::{FlatType, Query, QueryError};

/// Singapore is UTC+8 all year.
const SGT_OFFSET_HOURS: i64 = 8;

/// Model input columns, in order.
pub const FEATURE_NAMES: [&str; 13] = [
    "primary_school_count",
    "primary_school_nearest_km",
    "secondary_school_count",
    "secondary_school_nearest_km",
    "hawker_count",
    "hawker_nearest_km",
    "mrt_count",
    "mrt_nearest_km",
    "town",
    "resale_index",
    "rooms",
    "remaining_lease",
    "floor_band",
];

/// Amenity categories in feature-vector order.
const FEATURE_CATEGORIES: [AmenityCategory; 4] = [
    AmenityCategory::PrimarySchool,
    AmenityCategory::SecondarySchool,
    AmenityCategory::HawkerCentre,
    AmenityCategory::MrtStation,
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("HDB is not found in the area")]
    NoHousingNearby,
    #[error("town '{0}' is not known to the model")]
    UnknownTown(String),
    #[error("no resale price index published for {0} or earlier")]
    MissingResaleIndex(Quarter),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

impl ErrorCode for PredictionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Query(e) => e.error_code(),
            Self::NoHousingNearby => "E_NO_HOUSING_NEARBY",
            Self::UnknownTown(_) => "E_UNKNOWN_TOWN",
            Self::MissingResaleIndex(_) => "E_MISSING_RESALE_INDEX",
            Self::Predict(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Predict(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Search radii for the proximity features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRadii {
    /// Radius for amenity counts and listings.
    pub amenity_km: f64,
    /// Radius for resolving the town from street blocks.
    pub town_km: f64,
}

impl Default for SearchRadii {
    fn default() -> Self {
        Self { amenity_km: DEFAULT_AMENITY_RADIUS_KM, town_km: DEFAULT_TOWN_RADIUS_KM }
    }
}

/// Model input plus the lookups that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub values: Vec<f64>,
    pub town: String,
    /// Quarter whose index value was used.
    pub index_quarter: Quarter,
    pub nearby: Vec<(AmenityCategory, NearbySummary)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Thousands of SGD. Never negative.
    pub predicted_price: f64,
    pub flat_type: FlatType,
    pub remaining_lease_years: u32,
    pub floor_level: u32,
    pub town: String,
    /// Resale index quarter fed to the model; earlier than the requested
    /// quarter when that one is not published yet.
    pub quarter: Quarter,
    /// Every category merged, nearest first.
    pub nearby_amenities: Vec<NearbyAmenity>,
}

impl PredictionResult {
    /// Nearby amenities of one category, nearest first.
    pub fn by_category(&self, category: AmenityCategory) -> impl Iterator<Item = &NearbyAmenity> {
        self.nearby_amenities
            .iter()
            .filter(move |n| n.amenity.category == category)
    }
}

// =============================================================================
// FLOW
// =============================================================================

/// The current quarter in Singapore time.
#[must_use]
pub fn current_quarter() -> Quarter {
    let now = time::OffsetDateTime::now_utc() + time::Duration::hours(SGT_OFFSET_HOURS);
    Quarter::from_date(now.date())
}

/// Build the 13-value feature vector for `query`.
///
/// # Errors
///
/// [`PredictionError::NoHousingNearby`] when no street block lies within
/// `radii.town_km`, [`PredictionError::UnknownTown`] when the encoder has no
/// ordinal for that town, and [`PredictionError::MissingResaleIndex`] when
/// the index has no row at or before `quarter`.
pub fn assemble_features(
    query: &Query,
    data: &ReferenceData,
    quarter: Quarter,
    radii: SearchRadii,
) -> Result<Features, PredictionError> {
    let origin = query.location();

    let nearby: Vec<(AmenityCategory, NearbySummary)> = FEATURE_CATEGORIES
        .iter()
        .map(|&category| (category, data.table(category).summarize(origin, radii.amenity_km)))
        .collect();

    let town = data
        .nearest_town(origin, radii.town_km)
        .ok_or(PredictionError::NoHousingNearby)?;
    let town_code = data
        .town_encoder
        .encode(town)
        .ok_or_else(|| PredictionError::UnknownTown(town.to_owned()))?;
    let (index_quarter, index_value) = data
        .resale_index
        .lookup(quarter)
        .ok_or(PredictionError::MissingResaleIndex(quarter))?;

    let mut values = Vec::with_capacity(FEATURE_NAMES.len());
    for (_, summary) in &nearby {
        values.push(count_feature(summary.count));
        // Loaded tables are never empty, so a missing nearest only shows up
        // with hand-built data.
        values.push(summary.nearest_km.unwrap_or(0.0));
    }
    values.push(f64::from(town_code));
    values.push(index_value);
    values.push(f64::from(query.flat_type().rooms()));
    values.push(f64::from(query.remaining_lease_years()));
    values.push(f64::from(query.floor_band()));

    Ok(Features { values, town: town.to_owned(), index_quarter, nearby })
}

/// Run the whole prediction flow for `query`.
///
/// Routes pass [`current_quarter`] for `quarter`.
///
/// # Errors
///
/// Any [`PredictionError`] from feature assembly or the predictor.
pub async fn predict(
    query: &Query,
    data: &ReferenceData,
    predictor: &dyn PricePredictor,
    radii: SearchRadii,
    quarter: Quarter,
) -> Result<PredictionResult, PredictionError> {
    let features = assemble_features(query, data, quarter, radii)?;
    let predicted_price = predictor.predict(&features.values).await?;

    tracing::info!(
        predictor = predictor.name(),
        town = %features.town,
        quarter = %features.index_quarter,
        predicted_price,
        "prediction complete"
    );

    let nearby_amenities = merge_by_distance(features.nearby.into_iter().map(|(_, s)| s.amenities));

    Ok(PredictionResult {
        predicted_price,
        flat_type: query.flat_type(),
        remaining_lease_years: query.remaining_lease_years(),
        floor_level: query.floor_level(),
        town: features.town,
        quarter: features.index_quarter,
        nearby_amenities,
    })
}

fn count_feature(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[path = "prediction_test.rs"]
mod tests;
