//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the two HTML pages (main form and results), the
//! JSON API under `/api`, a liveness probe, and the picker's static assets
//! under `/static`. Every request passes through tracing and compression.

pub mod api;
pub mod pages;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/predict", post(pages::predict))
        .route("/api/predict", post(api::predict))
        .route("/api/amenities", get(api::amenities))
        .route("/api/map-config", get(api::map_config))
        .route("/healthz", get(healthz))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
