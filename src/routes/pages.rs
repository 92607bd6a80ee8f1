//! HTML routes: the main form and the results page.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use crate::error::ErrorCode;
use crate::pages::{self, FormValues, MODEL_ERROR_MESSAGE, NO_HOUSING_MESSAGE};
use crate::query::{FlatType, Query, QueryError, parse_location, parse_whole_number};
use crate::routes::api::prediction_status;
use crate::services::prediction::{self, PredictionError};
use crate::state::AppState;

/// Raw form fields. Everything is optional text so a bad field re-renders
/// the form instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PredictForm {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub flat_type: Option<String>,
    pub remaining_lease_years: Option<String>,
    pub floor_level: Option<String>,
}

impl PredictForm {
    /// Validate every field into a [`Query`].
    ///
    /// # Errors
    ///
    /// The first [`QueryError`] found, location first.
    pub fn to_query(&self) -> Result<Query, QueryError> {
        let defaults = FormValues::default();
        let location = parse_location(self.lat.as_deref(), self.lng.as_deref())?;
        let flat_type = match self.flat_type.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<FlatType>()?,
            None => defaults.flat_type,
        };
        let lease = parse_whole_number(
            "remaining_lease_years",
            self.remaining_lease_years.as_deref(),
            defaults.remaining_lease_years,
        )?;
        let floor = parse_whole_number("floor_level", self.floor_level.as_deref(), defaults.floor_level)?;
        Query::new(location, flat_type, lease, floor)
    }

    /// Best-effort values for re-rendering the form; unusable fields fall back
    /// to the defaults.
    #[must_use]
    pub fn form_values(&self) -> FormValues {
        let defaults = FormValues::default();
        let parse_f64 = |v: Option<&String>| v.and_then(|s| s.trim().parse::<f64>().ok()).filter(|v| v.is_finite());
        let parse_u32 = |v: Option<&String>, d: u32| v.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(d);
        FormValues {
            flat_type: self
                .flat_type
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.flat_type),
            remaining_lease_years: parse_u32(self.remaining_lease_years.as_ref(), defaults.remaining_lease_years),
            floor_level: parse_u32(self.floor_level.as_ref(), defaults.floor_level),
            lat: parse_f64(self.lat.as_ref()),
            lng: parse_f64(self.lng.as_ref()),
        }
    }
}

/// `GET /`: map picker and property form.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::render_main_page(state.map.as_deref(), &FormValues::default(), None))
}

/// `POST /predict`: results page on success. Input problems re-render the
/// form with a banner; model failures show the generic error page.
pub async fn predict(State(state): State<AppState>, Form(form): Form<PredictForm>) -> Response {
    let query = match form.to_query() {
        Ok(query) => query,
        Err(e) => {
            tracing::info!(code = e.error_code(), error = %e, "form rejected");
            return main_with_error(&state, &form, StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let outcome = prediction::predict(
        &query,
        &state.reference,
        state.predictor.as_ref(),
        state.radii,
        prediction::current_quarter(),
    )
    .await;

    match outcome {
        Ok(result) => Html(pages::render_result_page(&result)).into_response(),
        Err(PredictionError::NoHousingNearby) => {
            main_with_error(&state, &form, StatusCode::UNPROCESSABLE_ENTITY, NO_HOUSING_MESSAGE)
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "prediction failed");
            (prediction_status(&e), Html(pages::render_error_page(MODEL_ERROR_MESSAGE))).into_response()
        }
    }
}

fn main_with_error(state: &AppState, form: &PredictForm, status: StatusCode, message: &str) -> Response {
    let html = pages::render_main_page(state.map.as_deref(), &form.form_values(), Some(message));
    (status, Html(html)).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
