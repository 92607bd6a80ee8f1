//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Everything in it is built once at startup and read-only afterwards:
//! the reference tables, the predictor, and the map configuration (absent
//! when the TileJSON fetch failed). Cloning is a handful of `Arc` bumps.

use std::sync::Arc;

use crate::datasets::ReferenceData;
use crate::predictor::PricePredictor;
use crate::services::prediction::SearchRadii;
use crate::services::tilejson::MapConfig;

#[derive(Clone)]
pub struct AppState {
    pub reference: Arc<ReferenceData>,
    pub predictor: Arc<dyn PricePredictor>,
    /// `None` when the map configuration could not be loaded.
    pub map: Option<Arc<MapConfig>>,
    pub radii: SearchRadii,
}

impl AppState {
    #[must_use]
    pub fn new(
        reference: ReferenceData,
        predictor: Arc<dyn PricePredictor>,
        map: Option<MapConfig>,
        radii: SearchRadii,
    ) -> Self {
        Self { reference: Arc::new(reference), predictor, map: map.map(Arc::new), radii }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use super::*;
    use crate::datasets::ReferenceTexts;
    use crate::predictor::PredictError;

    /// Reference tables from the fixtures in `data/`.
    #[must_use]
    pub fn fixture_reference_data() -> ReferenceData {
        ReferenceData::from_texts(ReferenceTexts {
            stations: include_str!("../data/train_stations.csv").into(),
            hawkers: include_str!("../data/hawker_markets.csv").into(),
            schools: include_str!("../data/schools.csv").into(),
            street_blocks: include_str!("../data/street_blocks.csv").into(),
            resale_index: include_str!("../data/resale_index.csv").into(),
            town_encoding: include_str!("../data/town_encoding.json").into(),
        })
        .expect("fixture reference data should parse")
    }

    #[must_use]
    pub fn fixture_map_config() -> MapConfig {
        MapConfig::from_tilejson(r#"{"tiles": ["https://tiles.example.test/{z}/{x}/{y}.png"], "attribution": "<b>OneMap</b>"}"#)
            .expect("fixture TileJSON should parse")
    }

    /// Predictor that answers with a fixed price or a fixed HTTP failure and
    /// records every feature vector it receives.
    pub struct StubPredictor {
        outcome: Result<f64, u16>,
        calls: Mutex<Vec<Vec<f64>>>,
    }

    impl StubPredictor {
        #[must_use]
        pub fn price(price: f64) -> Self {
            Self { outcome: Ok(price), calls: Mutex::new(Vec::new()) }
        }

        /// Fails every call with `PredictError::ApiResponse { status, .. }`.
        #[must_use]
        pub fn failing(status: u16) -> Self {
            Self { outcome: Err(status), calls: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> Vec<Vec<f64>> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait::async_trait]
    impl PricePredictor for StubPredictor {
        async fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
            self.calls.lock().expect("calls lock").push(features.to_vec());
            self.outcome
                .map_err(|status| PredictError::ApiResponse { status, body: "stub failure".into() })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Test `AppState` with fixture tables, a map config, and `predictor`.
    #[must_use]
    pub fn test_app_state_with_predictor(predictor: Arc<dyn PricePredictor>) -> AppState {
        AppState::new(fixture_reference_data(), predictor, Some(fixture_map_config()), SearchRadii::default())
    }

    /// Test `AppState` whose predictor always answers 450 (thousand SGD).
    #[must_use]
    pub fn test_app_state() -> AppState {
        test_app_state_with_predictor(Arc::new(StubPredictor::price(450.0)))
    }

    /// Test `AppState` as if the TileJSON fetch had failed.
    #[must_use]
    pub fn test_app_state_without_map() -> AppState {
        AppState { map: None, ..test_app_state() }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
