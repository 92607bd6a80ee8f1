use std::time::Duration;

use hdb_resale::config::AppConfig;
use hdb_resale::datasets::ReferenceData;
use hdb_resale::predictor;
use hdb_resale::routes;
use hdb_resale::services::prediction::SearchRadii;
use hdb_resale::services::tilejson;
use hdb_resale::state::AppState;

/// Timeout for startup fetches (reference tables, TileJSON).
const STARTUP_FETCH_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().unwrap_or_else(|e| fatal("invalid configuration", &e));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(STARTUP_FETCH_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| fatal("HTTP client build failed", &e));

    let reference = ReferenceData::load(&config.data_source, &http)
        .await
        .unwrap_or_else(|e| fatal("reference data load failed", &e));
    tracing::info!(
        stations = reference.stations.len(),
        hawkers = reference.hawkers.len(),
        primary_schools = reference.primary_schools.len(),
        secondary_schools = reference.secondary_schools.len(),
        street_blocks = reference.street_blocks.len(),
        towns = reference.town_encoder.len(),
        "reference data loaded"
    );

    let predictor = predictor::from_config(&config.predictor)
        .await
        .unwrap_or_else(|e| fatal("predictor init failed", &e));
    tracing::info!(predictor = predictor.name(), "predictor initialized");

    // Non-fatal: the page shows a banner and the API answers 503.
    let map = match tilejson::fetch(&http, &config.tilejson_url).await {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::warn!(error = %e, url = %config.tilejson_url, "map configuration unavailable");
            None
        }
    };

    let radii = SearchRadii { amenity_km: config.amenity_radius_km, town_km: config.town_radius_km };
    let state = AppState::new(reference, predictor, map, radii);
    let app = routes::app(state, &config.static_dir);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap_or_else(|e| fatal("failed to bind", &e));

    tracing::info!(%port, "hdb-resale listening");
    if let Err(e) = axum::serve(listener, app).await {
        fatal("server failed", &e);
    }
}

fn fatal(context: &str, err: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %err, "{context}");
    std::process::exit(1);
}
