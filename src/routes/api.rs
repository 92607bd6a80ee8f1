//! JSON API routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query as QueryParams, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::amenity::{AmenityCategory, NearbyAmenity, merge_by_distance};
use crate::error::{ApiError, ErrorCode};
use crate::geo::Coordinate;
use crate::query::{FlatType, Query, QueryError, parse_location};
use crate::services::prediction::{self, PredictionError, PredictionResult};
use crate::services::tilejson::MapConfig;
use crate::state::AppState;

/// Largest radius `/api/amenities` accepts.
pub const MAX_AMENITY_RADIUS_KM: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("radius_km must be a number in (0, {MAX_AMENITY_RADIUS_KM}], got '{0}'")]
    InvalidRadius(String),
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("map configuration unavailable")]
    MapUnavailable,
}

impl ErrorCode for RouteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Query(e) => e.error_code(),
            Self::InvalidRadius(_) => "E_INVALID_RADIUS",
            Self::Malformed(_) => "E_MALFORMED_REQUEST",
            Self::MapUnavailable => "E_MAP_UNAVAILABLE",
        }
    }
}

/// `lat`/`lng` are optional so a missing location reports `E_NO_LOCATION`
/// like the form does.
#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub flat_type: String,
    pub remaining_lease_years: u32,
    pub floor_level: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct AmenitiesParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius_km: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: AmenityCategory,
    pub count: usize,
    pub nearest_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AmenitiesResponse {
    pub location: Coordinate,
    pub radius_km: f64,
    pub categories: Vec<CategorySummary>,
    /// All categories merged, nearest first.
    pub amenities: Vec<NearbyAmenity>,
}

/// Status for a failed prediction.
pub(crate) fn prediction_status(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::Query(_) => StatusCode::BAD_REQUEST,
        PredictionError::NoHousingNearby => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::UnknownTown(_) | PredictionError::MissingResaleIndex(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PredictionError::Predict(_) => StatusCode::BAD_GATEWAY,
    }
}

/// `POST /api/predict`: predicted price and nearby amenities.
///
/// # Errors
///
/// 400 for invalid input or an unreadable body, 422 when no HDB block is
/// nearby, 502 when the model fails, 500 for reference data gaps.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictBody>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(body) = body.map_err(|e| malformed(&e.body_text()))?;
    let query = build_query(&body).map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, &e))?;

    prediction::predict(
        &query,
        &state.reference,
        state.predictor.as_ref(),
        state.radii,
        prediction::current_quarter(),
    )
    .await
    .map(Json)
    .map_err(|e| {
        let status = prediction_status(&e);
        if status.is_server_error() {
            tracing::error!(error = %e, code = e.error_code(), "prediction failed");
        }
        ApiError::new(status, &e)
    })
}

fn malformed(detail: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, &RouteError::Malformed(detail.to_owned()))
}

fn build_query(body: &PredictBody) -> Result<Query, QueryError> {
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(QueryError::NoLocation);
    };
    let location = Coordinate::new(lat, lng)?;
    let flat_type: FlatType = body.flat_type.parse()?;
    Query::new(location, flat_type, body.remaining_lease_years, body.floor_level)
}

/// `GET /api/amenities?lat=..&lng=..&radius_km=..`: nearby amenities of
/// every category. Any valid coordinate is accepted, not just Singapore.
///
/// # Errors
///
/// 400 for a missing or invalid location or radius.
pub async fn amenities(
    State(state): State<AppState>,
    params: Result<QueryParams<AmenitiesParams>, QueryRejection>,
) -> Result<Json<AmenitiesResponse>, ApiError> {
    let bad_request = |e: RouteError| ApiError::new(StatusCode::BAD_REQUEST, &e);

    let QueryParams(params) = params.map_err(|e| malformed(&e.body_text()))?;
    let location = parse_location(params.lat.as_deref(), params.lng.as_deref())
        .map_err(|e| bad_request(e.into()))?;
    let radius_km = parse_radius(params.radius_km.as_deref(), state.radii.amenity_km).map_err(bad_request)?;

    let mut categories = Vec::with_capacity(AmenityCategory::ALL.len());
    let mut lists = Vec::with_capacity(AmenityCategory::ALL.len());
    for category in AmenityCategory::ALL {
        let summary = state.reference.table(category).summarize(location, radius_km);
        categories.push(CategorySummary { category, count: summary.count, nearest_km: summary.nearest_km });
        lists.push(summary.amenities);
    }

    Ok(Json(AmenitiesResponse { location, radius_km, categories, amenities: merge_by_distance(lists) }))
}

/// Blank or absent means `default`.
fn parse_radius(raw: Option<&str>, default: f64) -> Result<f64, RouteError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(km) if km.is_finite() && km > 0.0 && km <= MAX_AMENITY_RADIUS_KM => Ok(km),
        _ => Err(RouteError::InvalidRadius(raw.to_owned())),
    }
}

/// `GET /api/map-config`: Leaflet settings derived from TileJSON.
///
/// # Errors
///
/// 503 when the TileJSON fetch failed at startup.
pub async fn map_config(State(state): State<AppState>) -> Result<Json<MapConfig>, ApiError> {
    state
        .map
        .as_deref()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, &RouteError::MapUnavailable))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
