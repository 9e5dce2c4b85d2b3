use crate::domain::Coordinate;
use geo::{Distance, Geodesic, Point};

/// Geodesic (WGS84 ellipsoid) distance between two coordinates in kilometers
pub fn geodesic_km(a: Coordinate, b: Coordinate) -> f64 {
    let from = Point::new(a.lon, a.lat);
    let to = Point::new(b.lon, b.lat);
    Geodesic::distance(from, to) / 1000.0
}
