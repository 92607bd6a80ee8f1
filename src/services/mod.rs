//! Domain services used by the HTML and JSON routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the prediction flow and external lookups so route
//! handlers can stay focused on form/JSON translation and status codes.

pub mod prediction;
pub mod tilejson;
