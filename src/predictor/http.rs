//! Hosted inference endpoint client.
//!
//! Request body is `{"instances": [[f1, ..., fn]]}`. The endpoint answers
//! either with a bare JSON array of prices or with `{"predictions": [...]}`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::{PredictError, PricePredictor, normalize_price};
use crate::config::HttpTimeouts;

pub struct HttpPredictor {
    http: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a [f64]; 1],
}

impl HttpPredictor {
    /// # Errors
    ///
    /// Returns [`PredictError::HttpClientBuild`] if the client cannot be built.
    pub fn new(url: String, timeouts: HttpTimeouts) -> Result<Self, PredictError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| PredictError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url })
    }

    async fn send_json(&self, body: &impl Serialize) -> Result<String, PredictError> {
        let response = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| PredictError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PredictError::ApiRequest(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(PredictError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl PricePredictor for HttpPredictor {
    async fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let text = self.send_json(&PredictRequest { instances: [features] }).await?;
        normalize_price(parse_prediction_response(&text)?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Extract the first prediction from an endpoint response body.
///
/// # Errors
///
/// [`PredictError::ApiParse`] for malformed bodies, [`PredictError::EmptyResponse`]
/// when the prediction list is empty.
pub fn parse_prediction_response(text: &str) -> Result<f64, PredictError> {
    let value: Value = serde_json::from_str(text).map_err(|e| PredictError::ApiParse(e.to_string()))?;

    let predictions = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("predictions")
            .and_then(Value::as_array)
            .ok_or_else(|| PredictError::ApiParse("missing 'predictions' array".into()))?,
        _ => return Err(PredictError::ApiParse("expected a JSON array or object".into())),
    };

    let first = predictions.first().ok_or(PredictError::EmptyResponse)?;
    // Some serving stacks wrap each prediction in its own array.
    let first = match first {
        Value::Array(inner) => inner.first().ok_or(PredictError::EmptyResponse)?,
        other => other,
    };
    first
        .as_f64()
        .ok_or_else(|| PredictError::ApiParse(format!("prediction is not a number: {first}")))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
