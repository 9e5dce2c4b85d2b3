pub mod coordinate;
pub mod element;
pub mod facility;

pub use coordinate::Coordinate;
pub use element::{ElementKind, RawElement, Tags};
pub use facility::{Facility, NOT_AVAILABLE, UNNAMED_FACILITY, floor_km, round_km};
