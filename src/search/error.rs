use thiserror::Error;

/// Terminal failures of a facility search. Any of these aborts the whole search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("location query must not be empty")]
    InvalidQuery,

    #[error("radius must be a positive number of km, got {radius_km}")]
    InvalidRadius { radius_km: f64 },

    #[error("radius must be between {min} and {max} km, got {radius_km}")]
    RadiusOutOfRange { radius_km: f64, min: f64, max: f64 },

    #[error("could not find coordinates for: {query}")]
    LocationNotFound { query: String },

    #[error("geocoding service failed: {0}")]
    Geocoder(String),

    #[error("Overpass API returned error status {status}: {body}")]
    FetchFailed { status: u16, body: String },

    #[error("Overpass API request timed out")]
    FetchTimeout,

    #[error("failed to reach Overpass API: {0}")]
    Transport(String),

    #[error("failed to parse Overpass JSON response: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    /// Short machine-readable kind, used by the HTTP layer and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery => "invalid_query",
            SearchError::InvalidRadius { .. } | SearchError::RadiusOutOfRange { .. } => {
                "invalid_radius"
            }
            SearchError::LocationNotFound { .. } => "location_not_found",
            SearchError::Geocoder(_) => "geocoder_failed",
            SearchError::FetchFailed { .. } => "fetch_failed",
            SearchError::FetchTimeout => "fetch_timeout",
            SearchError::Transport(_) => "transport",
            SearchError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Whether the caller supplied bad input, as opposed to an upstream failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidQuery
                | SearchError::InvalidRadius { .. }
                | SearchError::RadiusOutOfRange { .. }
        )
    }
}
