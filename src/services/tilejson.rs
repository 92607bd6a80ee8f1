//! Map configuration from a TileJSON document.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser draws OneMap raster tiles with Leaflet. At startup the server
//! fetches the provider's TileJSON once, reduces it to the handful of fields
//! the page needs, and embeds the result in the main page. A failed fetch
//! does not stop the server; pages show a banner and the API answers 503.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::geo::{BoundingBox, Coordinate, SINGAPORE_BOUNDS, SINGAPORE_CENTER};

const DEFAULT_MINZOOM: u8 = 11;
const DEFAULT_MAXZOOM: u8 = 19;

#[derive(Debug, thiserror::Error)]
pub enum TileJsonError {
    #[error("TileJSON request failed: {0}")]
    Request(String),
    #[error("TileJSON endpoint returned status {0}")]
    Status(u16),
    #[error("TileJSON parse failed: {0}")]
    Parse(String),
    #[error("TileJSON lists no tile URLs")]
    NoTiles,
}

impl ErrorCode for TileJsonError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_TILEJSON_REQUEST",
            Self::Status(_) => "E_TILEJSON_STATUS",
            Self::Parse(_) => "E_TILEJSON_PARSE",
            Self::NoTiles => "E_TILEJSON_NO_TILES",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status(500..=599))
    }
}

/// The subset of a TileJSON document the page uses.
#[derive(Debug, Deserialize)]
struct TileJson {
    #[serde(default)]
    tiles: Vec<String>,
    minzoom: Option<u8>,
    maxzoom: Option<u8>,
    #[serde(default)]
    bounds: Vec<f64>,
    attribution: Option<String>,
}

/// Leaflet settings for the location picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub tile_url: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// One level in from the widest zoom.
    pub initial_zoom: u8,
    pub bounds: BoundingBox,
    pub center: Coordinate,
    pub attribution: Option<String>,
}

impl MapConfig {
    /// Reduce a TileJSON document to map settings, filling defaults.
    ///
    /// # Errors
    ///
    /// [`TileJsonError::Parse`] for invalid JSON and [`TileJsonError::NoTiles`]
    /// when `tiles` is empty.
    pub fn from_tilejson(text: &str) -> Result<Self, TileJsonError> {
        let doc: TileJson = serde_json::from_str(text).map_err(|e| TileJsonError::Parse(e.to_string()))?;
        let tile_url = doc.tiles.into_iter().next().ok_or(TileJsonError::NoTiles)?;

        let min_zoom = doc.minzoom.unwrap_or(DEFAULT_MINZOOM);
        let max_zoom = doc.maxzoom.unwrap_or(DEFAULT_MAXZOOM).max(min_zoom);
        let bounds = BoundingBox::from_tilejson(&doc.bounds).unwrap_or(SINGAPORE_BOUNDS);

        Ok(Self {
            tile_url,
            min_zoom,
            max_zoom,
            initial_zoom: min_zoom.saturating_add(1).min(max_zoom),
            bounds,
            center: SINGAPORE_CENTER,
            attribution: doc.attribution.filter(|a| !a.trim().is_empty()),
        })
    }
}

/// Fetch and reduce the TileJSON document at `url`.
///
/// # Errors
///
/// Returns a [`TileJsonError`] for network failures, non-2xx statuses, or an
/// unusable document.
pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<MapConfig, TileJsonError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| TileJsonError::Request(e.to_string()))?;
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(TileJsonError::Status(status));
    }
    let text = response
        .text()
        .await
        .map_err(|e| TileJsonError::Request(e.to_string()))?;
    MapConfig::from_tilejson(&text)
}

#[cfg(test)]
#[path = "tilejson_test.rs"]
mod tests;
