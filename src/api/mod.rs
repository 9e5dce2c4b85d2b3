pub mod nominatim;
pub mod overpass;

#[cfg(test)]
mod test_server;

pub use nominatim::{LocationResolver, NominatimResolver, RequestThrottle};
pub use overpass::{CandidateFetcher, OverpassClient, OverpassResponse, TagQueryClient};
