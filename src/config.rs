//! Application configuration parsed from environment variables.
//!
//! `main` loads a `.env` file first (if present), so every setting can live
//! there during development.

use std::path::PathBuf;

use crate::datasets::DataSource;
use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TILEJSON_URL: &str = "https://www.onemap.gov.sg/maps/json/raster/tilejson/2.2.0/Default.json";
pub const DEFAULT_PREDICTOR_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PREDICTOR_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AMENITY_RADIUS_KM: f64 = 1.0;
pub const DEFAULT_TOWN_RADIUS_KM: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
    #[error("set exactly one of PREDICTOR_URL or PREDICTOR_ARTIFACT")]
    PredictorBackend,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "E_CONFIG_INVALID_VALUE",
            Self::PredictorBackend => "E_CONFIG_PREDICTOR_BACKEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictorBackend {
    Http { url: String },
    Artifact { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorConfig {
    pub backend: PredictorBackend,
    pub timeouts: HttpTimeouts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub data_source: DataSource,
    pub predictor: PredictorConfig,
    pub tilejson_url: String,
    pub static_dir: PathBuf,
    pub amenity_radius_km: f64,
    pub town_radius_km: f64,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required (exactly one):
    /// - `PREDICTOR_URL`: hosted inference endpoint
    /// - `PREDICTOR_ARTIFACT`: path to a linear model JSON artifact
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATA_BASE_URL`: HTTP base for the reference tables; wins over `DATA_DIR`
    /// - `DATA_DIR`: local directory for the reference tables, default `./data`
    /// - `TILEJSON_URL`: map tile configuration, default `OneMap`
    /// - `STATIC_DIR`: static assets, default `<crate>/static`
    /// - `PREDICTOR_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PREDICTOR_CONNECT_TIMEOUT_SECS`: default 10
    /// - `AMENITY_RADIUS_KM`: default 1.0
    /// - `TOWN_RADIUS_KM`: default 1.0
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable values or an ambiguous
    /// predictor backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT)?;

        let data_source = match env_non_empty("DATA_BASE_URL") {
            Some(url) => DataSource::Url(url.trim_end_matches('/').to_string()),
            None => DataSource::Dir(env_non_empty("DATA_DIR").map_or_else(|| PathBuf::from("data"), PathBuf::from)),
        };

        let backend = match (env_non_empty("PREDICTOR_URL"), env_non_empty("PREDICTOR_ARTIFACT")) {
            (Some(url), None) => PredictorBackend::Http { url },
            (None, Some(path)) => PredictorBackend::Artifact { path: PathBuf::from(path) },
            _ => return Err(ConfigError::PredictorBackend),
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse("PREDICTOR_REQUEST_TIMEOUT_SECS", DEFAULT_PREDICTOR_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("PREDICTOR_CONNECT_TIMEOUT_SECS", DEFAULT_PREDICTOR_CONNECT_TIMEOUT_SECS)?,
        };

        let tilejson_url = env_non_empty("TILEJSON_URL").unwrap_or_else(|| DEFAULT_TILEJSON_URL.to_string());
        let static_dir = env_non_empty("STATIC_DIR")
            .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"), PathBuf::from);

        let amenity_radius_km = env_radius("AMENITY_RADIUS_KM", DEFAULT_AMENITY_RADIUS_KM)?;
        let town_radius_km = env_radius("TOWN_RADIUS_KM", DEFAULT_TOWN_RADIUS_KM)?;

        Ok(Self {
            port,
            data_source,
            predictor: PredictorConfig { backend, timeouts },
            tilejson_url,
            static_dir,
            amenity_radius_km,
            town_radius_km,
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key` if set; a set-but-unparseable value is an error, not a silent default.
fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_non_empty(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
        None => Ok(default),
    }
}

fn env_radius(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let radius = env_parse(key, default)?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ConfigError::InvalidValue { var: key, value: radius.to_string() });
    }
    Ok(radius)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
