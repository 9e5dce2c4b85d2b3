use crate::domain::Coordinate;
use serde::Deserialize;

/// Approximate kilometers per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.0;

/// How the longitude half-width of a search box is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BboxMode {
    /// Same degree offset on both axes (over-fetches east-west away from the equator)
    #[default]
    Flat,
    /// Longitude offset widened by 1/cos(lat) so the box spans radius_km on the ground
    LatitudeCorrected,
}

/// Axis-aligned lat/lon rectangle around a search center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Calculate a bounding box from center point and radius
    pub fn around(center: Coordinate, radius_km: f64, mode: BboxMode) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lon_delta = match mode {
            BboxMode::Flat => lat_delta,
            // 1 degree longitude ≈ 111 km * cos(lat)
            BboxMode::LatitudeCorrected => {
                radius_km / (KM_PER_DEGREE * center.lat.to_radians().cos().max(1e-6))
            }
        };

        Self {
            south: center.lat - lat_delta,
            west: center.lon - lon_delta,
            north: center.lat + lat_delta,
            east: center.lon + lon_delta,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Overpass QL bbox filter body: `south,west,north,east`
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}
