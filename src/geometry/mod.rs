pub mod bbox;
pub mod distance;

pub use bbox::{BboxMode, BoundingBox, KM_PER_DEGREE};
pub use distance::geodesic_km;
