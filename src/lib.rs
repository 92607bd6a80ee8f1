//! HDB resale price predictor.
//!
//! ARCHITECTURE
//! ============
//! A user clicks a point in Singapore and describes a flat; the server
//! looks up nearby MRT stations, hawker centres, and schools, resolves the
//! town and the current resale index, and asks an external model for a
//! price. The binary in `main.rs` only wires configuration, startup loading,
//! and the HTTP server around these modules.

pub mod amenity;
pub mod config;
pub mod datasets;
pub mod error;
pub mod geo;
pub mod pages;
pub mod predictor;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
