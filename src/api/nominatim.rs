use crate::config::NominatimConfig;
use crate::domain::Coordinate;
use crate::search::SearchError;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Resolves free-text place names to coordinates
pub trait LocationResolver {
    fn resolve(&self, query: &str) -> Result<Coordinate, SearchError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Spaces out requests to a rate-limited service.
///
/// Shared between resolvers through an `Arc`; callers queue on the lock, so
/// at most one request is released per interval.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Block until `min_interval` has passed since the previous request
    pub fn wait(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval - elapsed;
                debug!(pause_ms = pause.as_millis() as u64, "throttling Nominatim request");
                thread::sleep(pause);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Geocoder backed by the Nominatim search API.
///
/// Issues exactly one request per `resolve` call, with no retries. Nominatim's
/// usage policy allows at most one request per second, enforced by the throttle.
pub struct NominatimResolver {
    client: reqwest::blocking::Client,
    url: String,
    throttle: Arc<RequestThrottle>,
}

impl NominatimResolver {
    pub fn new(config: &NominatimConfig, throttle: Arc<RequestThrottle>) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Geocoder(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            throttle,
        })
    }
}

impl LocationResolver for NominatimResolver {
    fn resolve(&self, query: &str) -> Result<Coordinate, SearchError> {
        debug!(query, url = %self.url, "geocoding location");

        self.throttle.wait();
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|e| SearchError::Geocoder(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SearchError::Geocoder(format!(
                "Nominatim API returned error status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| SearchError::Geocoder(format!("failed to read response: {e}")))?;

        let coordinate = parse_first_match(&body)?.ok_or_else(|| SearchError::LocationNotFound {
            query: query.to_string(),
        })?;

        info!(query, %coordinate, "resolved location");
        Ok(coordinate)
    }
}

/// Parse a Nominatim JSON array and return the first hit, if any
fn parse_first_match(body: &str) -> Result<Option<Coordinate>, SearchError> {
    let results: Vec<NominatimResult> = serde_json::from_str(body)
        .map_err(|e| SearchError::Geocoder(format!("failed to parse Nominatim JSON: {e}")))?;

    let Some(result) = results.into_iter().next() else {
        return Ok(None);
    };
    debug!(display_name = %result.display_name, "first geocoding match");

    let lat: f64 = result
        .lat
        .parse()
        .map_err(|_| SearchError::Geocoder(format!("invalid latitude: {}", result.lat)))?;
    let lon: f64 = result
        .lon
        .parse()
        .map_err(|_| SearchError::Geocoder(format!("invalid longitude: {}", result.lon)))?;

    Ok(Some(Coordinate::new(lat, lon)))
}
