//! Amenity tables and proximity lookup.
//!
//! DESIGN
//! ======
//! Each category is a flat `Vec` scanned linearly per query. A city-state
//! has a few hundred points per category, so a full scan with a stable sort
//! by distance is all the lookup needs. No spatial index.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, round_km};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityCategory {
    MrtStation,
    HawkerCentre,
    PrimarySchool,
    SecondarySchool,
}

impl AmenityCategory {
    pub const ALL: [AmenityCategory; 4] =
        [Self::MrtStation, Self::HawkerCentre, Self::PrimarySchool, Self::SecondarySchool];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MrtStation => "mrt_station",
            Self::HawkerCentre => "hawker_centre",
            Self::PrimarySchool => "primary_school",
            Self::SecondarySchool => "secondary_school",
        }
    }
}

impl fmt::Display for AmenityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest loaded from a reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityPoint {
    pub name: String,
    pub location: Coordinate,
    pub category: AmenityCategory,
}

/// An amenity paired with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAmenity {
    pub amenity: AmenityPoint,
    pub distance_km: f64,
}

/// Proximity features for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySummary {
    /// Rows within the radius, duplicates included.
    pub count: usize,
    /// Distance to the closest row, rounded to 0.1 km. `None` for an empty table.
    pub nearest_km: Option<f64>,
    /// Rows within the radius, nearest first, one entry per name.
    pub amenities: Vec<NearbyAmenity>,
}

// =============================================================================
// TABLE
// =============================================================================

/// Read-only table of amenities of a single category.
#[derive(Debug, Clone, Default)]
pub struct AmenityTable {
    points: Vec<AmenityPoint>,
}

impl AmenityTable {
    #[must_use]
    pub fn new(points: Vec<AmenityPoint>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[AmenityPoint] {
        &self.points
    }

    /// Every row with its distance from `origin`, nearest first.
    ///
    /// The sort is stable, so rows at equal distance keep table order.
    #[must_use]
    pub fn by_distance(&self, origin: Coordinate) -> Vec<NearbyAmenity> {
        let mut ranked: Vec<NearbyAmenity> = self
            .points
            .iter()
            .map(|p| NearbyAmenity { amenity: p.clone(), distance_km: origin.distance_km(&p.location) })
            .collect();
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked
    }

    /// Rows within `radius_km` (inclusive), nearest first.
    #[must_use]
    pub fn within(&self, origin: Coordinate, radius_km: f64) -> Vec<NearbyAmenity> {
        let mut ranked = self.by_distance(origin);
        ranked.retain(|n| n.distance_km <= radius_km);
        ranked
    }

    /// The `k` closest rows, nearest first.
    #[must_use]
    pub fn nearest(&self, origin: Coordinate, k: usize) -> Vec<NearbyAmenity> {
        let mut ranked = self.by_distance(origin);
        ranked.truncate(k);
        ranked
    }

    /// Count, nearest distance, and distinct names within `radius_km`.
    #[must_use]
    pub fn summarize(&self, origin: Coordinate, radius_km: f64) -> NearbySummary {
        let ranked = self.by_distance(origin);
        let nearest_km = ranked.first().map(|n| round_km(n.distance_km));

        let within: Vec<NearbyAmenity> = ranked
            .into_iter()
            .take_while(|n| n.distance_km <= radius_km)
            .collect();
        let count = within.len();

        let mut seen = HashSet::new();
        let amenities = within
            .into_iter()
            .filter(|n| seen.insert(n.amenity.name.clone()))
            .collect();

        NearbySummary { count, nearest_km, amenities }
    }
}

/// Merge per-category lists into one list, nearest first.
#[must_use]
pub fn merge_by_distance(lists: impl IntoIterator<Item = Vec<NearbyAmenity>>) -> Vec<NearbyAmenity> {
    let mut merged: Vec<NearbyAmenity> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    merged
}

#[cfg(test)]
#[path = "amenity_test.rs"]
mod tests;
