use crate::api::{
    CandidateFetcher, LocationResolver, NominatimResolver, OverpassClient, RequestThrottle,
    TagQueryClient,
};
use crate::config::{
    FileConfig, MAX_RADIUS_KM, MAX_RESULTS, MIN_RADIUS_KM, NominatimConfig, OverpassConfig,
};
use crate::domain::{Coordinate, Facility};
use crate::geometry::BboxMode;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::classifier::{FacilityClassifier, KeywordRules};
use super::error::SearchError;
use super::ranker::rank;

/// Everything needed to build the collaborators of one search
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub bbox_mode: BboxMode,
    pub max_results: usize,
    pub overpass: OverpassConfig,
    pub nominatim: NominatimConfig,
    pub rules: KeywordRules,
    /// Shared by every search built from clones of these settings
    pub geocoder_throttle: Arc<RequestThrottle>,
}

fn geocoder_throttle(config: &NominatimConfig) -> Arc<RequestThrottle> {
    Arc::new(RequestThrottle::new(Duration::from_millis(
        config.min_interval_ms,
    )))
}

impl Default for SearchSettings {
    fn default() -> Self {
        let nominatim = NominatimConfig::default();
        Self {
            bbox_mode: BboxMode::default(),
            max_results: MAX_RESULTS,
            overpass: OverpassConfig::default(),
            geocoder_throttle: geocoder_throttle(&nominatim),
            nominatim,
            rules: KeywordRules::default(),
        }
    }
}

impl From<&FileConfig> for SearchSettings {
    fn from(config: &FileConfig) -> Self {
        Self {
            bbox_mode: config.bbox_mode,
            max_results: config.max_results.min(MAX_RESULTS),
            overpass: config.overpass.clone(),
            nominatim: config.nominatim.clone(),
            rules: config.filter.clone(),
            geocoder_throttle: geocoder_throttle(&config.nominatim),
        }
    }
}

/// Ranked result of one search, plus the context needed to present it
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub center: Coordinate,
    pub radius_km: f64,
    pub facilities: Vec<Facility>,
}

/// Any finite, positive radius is searchable
pub fn validate_radius(radius_km: f64) -> Result<(), SearchError> {
    if radius_km.is_finite() && radius_km > 0.0 {
        Ok(())
    } else {
        Err(SearchError::InvalidRadius { radius_km })
    }
}

/// Narrower range accepted from HTTP clients and the command line
pub fn validate_radius_range(radius_km: f64) -> Result<(), SearchError> {
    validate_radius(radius_km)?;
    if (MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius_km) {
        Ok(())
    } else {
        Err(SearchError::RadiusOutOfRange {
            radius_km,
            min: MIN_RADIUS_KM,
            max: MAX_RADIUS_KM,
        })
    }
}

/// Geocode, fetch, classify and rank in one sequential pass.
///
/// Holds no state between searches beyond its immutable collaborators.
pub struct FacilitySearch<R, C> {
    resolver: R,
    fetcher: CandidateFetcher<C>,
    classifier: FacilityClassifier,
    max_results: usize,
}

impl FacilitySearch<NominatimResolver, OverpassClient> {
    /// Build the network-backed pipeline
    pub fn from_settings(settings: &SearchSettings) -> Result<Self, SearchError> {
        let resolver = NominatimResolver::new(
            &settings.nominatim,
            Arc::clone(&settings.geocoder_throttle),
        )?;
        let client = OverpassClient::new(&settings.overpass)?;
        Ok(Self::new(resolver, client, settings))
    }
}

impl<R: LocationResolver, C: TagQueryClient> FacilitySearch<R, C> {
    pub fn new(resolver: R, client: C, settings: &SearchSettings) -> Self {
        Self {
            resolver,
            fetcher: CandidateFetcher::new(
                client,
                settings.bbox_mode,
                settings.overpass.query_timeout_secs,
            ),
            classifier: FacilityClassifier::new(settings.rules.clone()),
            max_results: settings.max_results.min(MAX_RESULTS),
        }
    }

    pub fn fetcher(&self) -> &CandidateFetcher<C> {
        &self.fetcher
    }

    /// Search around a free-text location
    pub fn search(&self, query: &str, radius_km: f64) -> Result<SearchOutcome, SearchError> {
        validate_radius(radius_km)?;
        let center = self.resolve(query)?;
        self.search_at(center, radius_km)
    }

    /// Geocode the location text on its own
    pub fn resolve(&self, query: &str) -> Result<Coordinate, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }
        self.resolver.resolve(query)
    }

    /// Search around known coordinates, skipping geocoding
    pub fn search_at(&self, center: Coordinate, radius_km: f64) -> Result<SearchOutcome, SearchError> {
        validate_radius(radius_km)?;

        let elements = self.fetcher.fetch(center, radius_km)?;
        let accepted = self.classifier.accept_all(&elements, center, radius_km);
        let facilities = rank(accepted, self.max_results);

        info!(
            candidates = elements.len(),
            returned = facilities.len(),
            radius_km,
            "search complete"
        );

        Ok(SearchOutcome {
            center,
            radius_km,
            facilities,
        })
    }
}
