//! Server-rendered HTML pages.
//!
//! DESIGN
//! ======
//! Pages are plain string templates under `templates/` with `{{NAME}}`
//! placeholders. Every value that came from the user or a reference table is
//! escaped before substitution. [`fill`] substitutes in a single pass over
//! the template, so inserted text is never scanned for further placeholders.

use crate::amenity::{AmenityCategory, NearbyAmenity};
use crate::query::{
    FlatType, MAX_FLOOR_LEVEL, MAX_REMAINING_LEASE_YEARS, MIN_FLOOR_LEVEL, MIN_REMAINING_LEASE_YEARS,
};
use crate::services::prediction::PredictionResult;
use crate::services::tilejson::MapConfig;

const LAYOUT_TEMPLATE: &str = include_str!("../templates/layout.html");
const PICKER_TEMPLATE: &str = include_str!("../templates/picker.html");
const RESULT_TEMPLATE: &str = include_str!("../templates/result.html");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

const MAP_SCRIPTS: &str = concat!(
    "  <script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n",
    "  <script src=\"/static/app.js\"></script>",
);

pub const MODEL_ERROR_MESSAGE: &str = "Sorry the app has encountered some error! Please try again later!";
pub const MAP_ERROR_MESSAGE: &str = "Failed to load map configuration. Please try again later.";
pub const NO_HOUSING_MESSAGE: &str =
    "HDB is not found in the area. Please select your coordinates from urban area within Singapore";

pub const DEFAULT_REMAINING_LEASE_YEARS: u32 = 90;
pub const DEFAULT_FLOOR_LEVEL: u32 = 10;

// =============================================================================
// FORM
// =============================================================================

/// Values shown in the property form, either defaults or the last submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub flat_type: FlatType,
    pub remaining_lease_years: u32,
    pub floor_level: u32,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            flat_type: FlatType::default(),
            remaining_lease_years: DEFAULT_REMAINING_LEASE_YEARS,
            floor_level: DEFAULT_FLOOR_LEVEL,
            lat: None,
            lng: None,
        }
    }
}

// =============================================================================
// PAGES
// =============================================================================

/// Main page: map picker and property form, with an optional error banner.
///
/// Without a map configuration only the map error is shown, since no
/// location can be picked.
#[must_use]
pub fn render_main_page(map: Option<&MapConfig>, form: &FormValues, error: Option<&str>) -> String {
    let Some(map) = map else {
        return layout(&error_banner(MAP_ERROR_MESSAGE), "");
    };

    let options: Vec<String> = FlatType::ALL
        .iter()
        .map(|flat_type| {
            let selected = if *flat_type == form.flat_type { " selected" } else { "" };
            format!("        <option value=\"{0}\"{selected}>{0}</option>", flat_type.label())
        })
        .collect();

    let content = fill(
        PICKER_TEMPLATE,
        &[
            ("LAT_DISPLAY", display_degrees(form.lat).as_str()),
            ("LNG_DISPLAY", display_degrees(form.lng).as_str()),
            ("LAT", form.lat.map(|v| v.to_string()).unwrap_or_default().as_str()),
            ("LNG", form.lng.map(|v| v.to_string()).unwrap_or_default().as_str()),
            ("FLAT_TYPE_OPTIONS", options.join("\n").as_str()),
            ("LEASE_MIN", MIN_REMAINING_LEASE_YEARS.to_string().as_str()),
            ("LEASE_MAX", MAX_REMAINING_LEASE_YEARS.to_string().as_str()),
            ("LEASE", form.remaining_lease_years.to_string().as_str()),
            ("FLOOR_MIN", MIN_FLOOR_LEVEL.to_string().as_str()),
            ("FLOOR_MAX", MAX_FLOOR_LEVEL.to_string().as_str()),
            ("FLOOR", form.floor_level.to_string().as_str()),
            ("MAP_CONFIG_JSON", map_config_json(map).as_str()),
            ("ERROR_BANNER", error.map(error_banner).unwrap_or_default().as_str()),
        ],
    );

    layout(&content, MAP_SCRIPTS)
}

/// Results page: property details, predicted price, nearby amenities.
#[must_use]
pub fn render_result_page(result: &PredictionResult) -> String {
    let transportation = section("Transportation", &[("Nearby MRT Stations", AmenityCategory::MrtStation)], result);
    let amenities = section(
        "Amenities",
        &[("Hawker Centers &amp; Food Markets", AmenityCategory::HawkerCentre)],
        result,
    );
    let education = section(
        "Education",
        &[
            ("Primary Schools in Vicinity", AmenityCategory::PrimarySchool),
            ("Secondary Schools in Vicinity", AmenityCategory::SecondarySchool),
        ],
        result,
    );
    let sections: Vec<String> = [transportation, amenities, education].into_iter().flatten().collect();

    let content = fill(
        RESULT_TEMPLATE,
        &[
            ("FLAT_TYPE", result.flat_type.label()),
            ("LEASE", result.remaining_lease_years.to_string().as_str()),
            ("PRICE", format_price(result.predicted_price).as_str()),
            ("TOWN", escape_html(&result.town).as_str()),
            ("SECTIONS", sections.join("\n").as_str()),
        ],
    );

    layout(&content, "")
}

/// Stand-alone error page with a link back to the main page.
#[must_use]
pub fn render_error_page(message: &str) -> String {
    layout(&fill(ERROR_TEMPLATE, &[("MESSAGE", escape_html(message).as_str())]), "")
}

// =============================================================================
// HELPERS
// =============================================================================

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Price in thousands of SGD, truncated: `645.9` becomes `"645K SGD"`.
#[must_use]
pub fn format_price(thousands_sgd: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let whole = thousands_sgd.trunc() as i64;
    format!("{whole}K SGD")
}

/// Replace each `{{NAME}}` in `template` with its value. Unknown
/// placeholders are kept as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn layout(content: &str, scripts: &str) -> String {
    fill(LAYOUT_TEMPLATE, &[("SCRIPTS", scripts), ("CONTENT", content)])
}

fn error_banner(message: &str) -> String {
    format!("    <div class=\"error-banner\" role=\"alert\">{}</div>", escape_html(message))
}

fn display_degrees(value: Option<f64>) -> String {
    value.map_or_else(|| "not selected".to_owned(), |v| format!("{v:.6}"))
}

/// JSON for a `<script type="application/json">` block; `<` is escaped so
/// the payload cannot close the element.
fn map_config_json(map: &MapConfig) -> String {
    serde_json::to_string(map)
        .unwrap_or_else(|_| "null".to_owned())
        .replace('<', "\\u003c")
}

/// One titled section with a list per category, or `None` when every list is empty.
fn section(title: &str, groups: &[(&str, AmenityCategory)], result: &PredictionResult) -> Option<String> {
    let lists: Vec<String> = groups
        .iter()
        .filter_map(|(heading, category)| {
            let items: Vec<String> = result.by_category(*category).map(list_item).collect();
            if items.is_empty() {
                return None;
            }
            Some(format!("        <h5>{heading}</h5>\n        <ul>\n{}\n        </ul>", items.join("\n")))
        })
        .collect();

    if lists.is_empty() {
        return None;
    }
    Some(format!("      <section>\n        <h4>{title}</h4>\n{}\n      </section>", lists.join("\n")))
}

fn list_item(nearby: &NearbyAmenity) -> String {
    format!(
        "          <li>{} <span class=\"distance\">{:.2} km</span></li>",
        escape_html(&nearby.amenity.name),
        nearby.distance_km
    )
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
