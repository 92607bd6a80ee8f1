//! Local linear model artifact.
//!
//! The artifact is a JSON export of a fitted linear regression:
//! `{"coefficients": [...], "intercept": x, "feature_names": [...]}`.

use serde::Deserialize;

use super::{PredictError, PricePredictor, normalize_price};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// # Errors
    ///
    /// Returns [`PredictError::Artifact`] for malformed JSON, a name list
    /// that disagrees with the coefficients, or non-finite weights.
    pub fn from_json(text: &str) -> Result<Self, PredictError> {
        let model: Self = serde_json::from_str(text).map_err(|e| PredictError::Artifact(e.to_string()))?;
        if !model.feature_names.is_empty() && model.feature_names.len() != model.coefficients.len() {
            return Err(PredictError::Artifact(format!(
                "{} feature names for {} coefficients",
                model.feature_names.len(),
                model.coefficients.len()
            )));
        }
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PredictError::Artifact("non-finite weight".into()));
        }
        Ok(model)
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw linear output, before clamping.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::FeatureCount`] when the input width is wrong.
    pub fn evaluate(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictError::FeatureCount { expected: self.coefficients.len(), actual: features.len() });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, f)| c * f)
                .sum::<f64>())
    }
}

#[async_trait::async_trait]
impl PricePredictor for LinearModel {
    async fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        normalize_price(self.evaluate(features)?)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
