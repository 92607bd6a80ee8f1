use std::path::PathBuf;

use super::*;
use crate::state::test_helpers::{test_app_state, test_app_state_without_map};

fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// Serve the full router on an ephemeral port and return its base URL.
async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state, &static_dir());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn healthz_returns_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn router_serves_pages_and_api() {
    let base = spawn_app(test_app_state()).await;
    let http = reqwest::Client::new();

    let index = http.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(index.status().as_u16(), 200);
    assert!(index.text().await.unwrap().contains("HDB Resale Price Predictor"));

    let health = http.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(health.status().as_u16(), 200);

    let amenities = http
        .get(format!("{base}/api/amenities?lat=1.3691&lng=103.8480"))
        .send()
        .await
        .unwrap();
    assert_eq!(amenities.status().as_u16(), 200);
    let body: serde_json::Value = amenities.json().await.unwrap();
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn router_handles_form_and_json_predictions() {
    let base = spawn_app(test_app_state()).await;
    let http = reqwest::Client::new();

    let page = http
        .post(format!("{base}/predict"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("lat=1.3691&lng=103.8480&flat_type=4-room&remaining_lease_years=90&floor_level=10")
        .send()
        .await
        .unwrap();
    assert_eq!(page.status().as_u16(), 200);
    assert!(page.text().await.unwrap().contains("450K SGD"));

    let api = http
        .post(format!("{base}/api/predict"))
        .json(&serde_json::json!({
            "lat": 1.3691,
            "lng": 103.8480,
            "flat_type": "5-room",
            "remaining_lease_years": 60,
            "floor_level": 3
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(api.status().as_u16(), 200);
    let body: serde_json::Value = api.json().await.unwrap();
    assert_eq!(body["flat_type"], "5-room");
    assert_eq!(body["town"], "ANG MO KIO");
    assert!(body["quarter"].as_str().is_some_and(|q| q.contains('Q')));
}

#[tokio::test]
async fn router_api_errors_are_json() {
    let base = spawn_app(test_app_state()).await;
    let http = reqwest::Client::new();

    let no_lat = http
        .post(format!("{base}/api/predict"))
        .json(&serde_json::json!({
            "lng": 103.8480,
            "flat_type": "4-room",
            "remaining_lease_years": 90,
            "floor_level": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_lat.status().as_u16(), 400);
    let body: serde_json::Value = no_lat.json().await.unwrap();
    assert_eq!(body["code"], "E_NO_LOCATION");
    assert_eq!(body["retryable"], false);

    let bad_type = http
        .post(format!("{base}/api/predict"))
        .json(&serde_json::json!({"lat": "north", "lng": 103.8480}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_type.status().as_u16(), 400);
    let body: serde_json::Value = bad_type.json().await.unwrap();
    assert_eq!(body["code"], "E_MALFORMED_REQUEST");

    let not_json = http
        .post(format!("{base}/api/predict"))
        .header("content-type", "text/plain")
        .body("lat=1.3691")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status().as_u16(), 400);
    let body: serde_json::Value = not_json.json().await.unwrap();
    assert_eq!(body["code"], "E_MALFORMED_REQUEST");

    let bad_radius = http
        .get(format!("{base}/api/amenities?lat=1.3691&lng=103.8480&radius_km=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_radius.status().as_u16(), 400);
    let body: serde_json::Value = bad_radius.json().await.unwrap();
    assert_eq!(body["code"], "E_INVALID_RADIUS");
}

#[tokio::test]
async fn router_serves_static_assets() {
    let base = spawn_app(test_app_state()).await;
    let js = reqwest::get(format!("{base}/static/app.js")).await.unwrap();
    assert_eq!(js.status().as_u16(), 200);
    assert!(js.text().await.unwrap().contains("map-config"));
}

#[tokio::test]
async fn router_reports_missing_map_config() {
    let base = spawn_app(test_app_state_without_map()).await;
    let resp = reqwest::get(format!("{base}/api/map-config")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "E_MAP_UNAVAILABLE");
    assert_eq!(body["retryable"], false);
}
