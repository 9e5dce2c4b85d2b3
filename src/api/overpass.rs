use crate::config::OverpassConfig;
use crate::domain::{Coordinate, RawElement};
use crate::geometry::{BboxMode, BoundingBox};
use crate::osm::parse_elements;
use crate::search::SearchError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Speciality values marking a hospital or clinic as a donation site
const DONATION_SPECIALITY: &str = "blood_donation|blood_bank";

/// Name pattern catching hospitals and clinics that are really blood centers
const DONATION_NAME: &str = "blood.*bank|blood.*donation|blood.*center";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A single element from Overpass, as emitted by `out center`
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Aggregate center, present on ways and relations
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// Executes Overpass QL queries against some endpoint
pub trait TagQueryClient {
    fn execute(&self, query: &str) -> Result<OverpassResponse, SearchError>;
}

/// Build the Overpass QL union of blood donation predicates for a bounding box
pub fn build_query(bbox: &BoundingBox, timeout_secs: u64) -> String {
    let b = bbox.to_overpass();
    format!(
        r#"[out:json][timeout:{timeout_secs}];
(
  nwr["amenity"="hospital"]["healthcare:speciality"~"{speciality}"]({b});
  nwr["amenity"="blood_bank"]({b});
  nwr["healthcare"="blood_donation"]({b});
  nwr["amenity"="clinic"]["healthcare:speciality"~"{speciality}"]({b});
  nwr["amenity"="hospital"]["name"~"{name}"]({b});
  nwr["amenity"="clinic"]["name"~"{name}"]({b});
  nwr["healthcare"="centre"]["healthcare:speciality"~"blood"]({b});
);
out center;"#,
        speciality = DONATION_SPECIALITY,
        name = DONATION_NAME,
    )
}

/// Blocking Overpass client. One POST per query, no retries.
pub struct OverpassClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl TagQueryClient for OverpassClient {
    fn execute(&self, query: &str) -> Result<OverpassResponse, SearchError> {
        // Overpass expects form-encoded POST data: data=<query>
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), "Overpass response");

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Overpass API returned error status");
            return Err(SearchError::FetchFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().map_err(map_transport_error)?;
        parse_response(&body)
    }
}

fn map_transport_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::FetchTimeout
    } else {
        SearchError::Transport(err.to_string())
    }
}

/// Decode an Overpass JSON document
pub fn parse_response(body: &str) -> Result<OverpassResponse, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))
}

/// Derives the search box, runs the tag query and turns the answer into usable elements
pub struct CandidateFetcher<C> {
    client: C,
    bbox_mode: BboxMode,
    query_timeout_secs: u64,
}

impl<C> CandidateFetcher<C> {
    pub fn new(client: C, bbox_mode: BboxMode, query_timeout_secs: u64) -> Self {
        Self {
            client,
            bbox_mode,
            query_timeout_secs,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: TagQueryClient> CandidateFetcher<C> {
    /// Fetch candidate elements around `center`.
    ///
    /// The box over-fetches its corners; callers enforce the circular radius.
    /// An empty element list is a successful, empty answer.
    pub fn fetch(&self, center: Coordinate, radius_km: f64) -> Result<Vec<RawElement>, SearchError> {
        let bbox = BoundingBox::around(center, radius_km, self.bbox_mode);
        let query = build_query(&bbox, self.query_timeout_secs);
        debug!(bbox = %bbox.to_overpass(), "querying Overpass");

        let response = self.client.execute(&query)?;
        let elements = parse_elements(&response);
        info!(
            received = response.elements.len(),
            usable = elements.len(),
            "fetched candidate elements"
        );
        Ok(elements)
    }
}
