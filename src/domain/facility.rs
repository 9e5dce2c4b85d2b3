use super::Coordinate;
use serde::{Deserialize, Serialize};

/// Sentinel used for contact fields the source data does not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Display name for elements without a `name` tag
pub const UNNAMED_FACILITY: &str = "Unnamed Blood Center";

/// A classified blood donation facility, ready for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    /// `addr:full`, else "street, city"; empty when neither is tagged
    pub address: String,
    pub phone: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Geodesic distance from the search center, rounded to 2 decimals
    pub distance_km: f64,
    pub opening_hours: String,
    pub website: String,
    pub facility_type: String,
}

impl Facility {
    pub fn has_website(&self) -> bool {
        self.website != NOT_AVAILABLE
    }

    /// Heat layer weight: nearer facilities weigh more, never below 1
    pub fn heat_weight(&self) -> f64 {
        (10.0 - self.distance_km).max(1.0)
    }
}

/// Round a distance to 2 decimal places
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Largest 2-decimal distance that does not exceed `km`
pub fn floor_km(km: f64) -> f64 {
    let rounded = round_km(km);
    if rounded > km {
        round_km(rounded - 0.01)
    } else {
        rounded
    }
}
