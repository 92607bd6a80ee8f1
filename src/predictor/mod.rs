//! Predictor: price inference behind a provider-neutral trait.
//!
//! DESIGN
//! ======
//! The trained model lives outside this repository. `PricePredictor` hides
//! whether it is reached over HTTP (a hosted inference endpoint) or loaded
//! from a local linear artifact, and lets tests substitute a mock. Failures
//! are surfaced once; nothing here retries.

pub mod http;
pub mod linear;

use std::sync::Arc;

use crate::config::{PredictorBackend, PredictorConfig};
use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// The HTTP request to the inference endpoint failed.
    #[error("prediction request failed: {0}")]
    ApiRequest(String),

    /// The inference endpoint returned a non-success status.
    #[error("prediction endpoint returned status {status}")]
    ApiResponse { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("prediction response parse failed: {0}")]
    ApiParse(String),

    /// The response held no predictions.
    #[error("prediction response was empty")]
    EmptyResponse,

    /// The model produced NaN or infinity.
    #[error("model returned a non-finite price: {0}")]
    InvalidPrice(f64),

    /// The feature vector does not match the model's input width.
    #[error("model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// The model artifact could not be read or parsed.
    #[error("model artifact: {0}")]
    Artifact(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for PredictError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::InvalidPrice(_) => "E_INVALID_PRICE",
            Self::FeatureCount { .. } => "E_FEATURE_COUNT",
            Self::Artifact(_) => "E_ARTIFACT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Model inference: feature vector in, price (thousands of SGD) out.
#[async_trait::async_trait]
pub trait PricePredictor: Send + Sync {
    /// Predict a price for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictError`] when the model is unreachable, rejects the
    /// input, or answers with something that is not a price.
    async fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Clamp a raw model output to a usable price.
///
/// # Errors
///
/// Returns [`PredictError::InvalidPrice`] for NaN or infinite output.
pub fn normalize_price(raw: f64) -> Result<f64, PredictError> {
    if !raw.is_finite() {
        return Err(PredictError::InvalidPrice(raw));
    }
    if raw < 0.0 {
        tracing::warn!(raw, "model returned a negative price, clamping to zero");
        return Ok(0.0);
    }
    Ok(raw)
}

/// Build the configured predictor.
///
/// # Errors
///
/// Returns a [`PredictError`] when the HTTP client cannot be built or the
/// artifact cannot be read.
pub async fn from_config(config: &PredictorConfig) -> Result<Arc<dyn PricePredictor>, PredictError> {
    match &config.backend {
        PredictorBackend::Http { url } => {
            Ok(Arc::new(http::HttpPredictor::new(url.clone(), config.timeouts)?))
        }
        PredictorBackend::Artifact { path } => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PredictError::Artifact(format!("{}: {e}", path.display())))?;
            Ok(Arc::new(linear::LinearModel::from_json(&text)?))
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
