use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::DEFAULT_RADIUS_KM;
use crate::domain::{Coordinate, Facility};
use crate::search::{FacilitySearch, SearchError, validate_radius_range};

use super::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    kind: &'static str,
}

pub(super) struct ApiError(StatusCode, String, &'static str);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            kind: self.2,
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError(status_for(&err), err.to_string(), err.kind())
    }
}

fn status_for(err: &SearchError) -> StatusCode {
    match err {
        SearchError::InvalidQuery
        | SearchError::InvalidRadius { .. }
        | SearchError::RadiusOutOfRange { .. } => StatusCode::BAD_REQUEST,
        SearchError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
        SearchError::FetchTimeout => StatusCode::GATEWAY_TIMEOUT,
        SearchError::Geocoder(_)
        | SearchError::FetchFailed { .. }
        | SearchError::Transport(_)
        | SearchError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

// ─── POST /api/blood-banks ───────────────────────────────────────

fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_radius")]
    pub radius: f64,
}

#[derive(Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for Coordinates {
    fn from(c: Coordinate) -> Self {
        Coordinates { lat: c.lat, lng: c.lon }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub location: String,
    pub coordinates: Coordinates,
    pub radius: f64,
    pub centers: Vec<Facility>,
    pub total_found: usize,
}

pub(super) async fn search_blood_banks(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let location = request.location.as_deref().unwrap_or("").trim().to_string();
    if location.is_empty() {
        return Err(SearchError::InvalidQuery.into());
    }
    let radius = request.radius;
    validate_radius_range(radius)?;

    let settings = state.settings.clone();
    let query = location.clone();
    // reqwest's blocking client must stay off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        FacilitySearch::from_settings(&settings)?.search(&query, radius)
    })
    .await
    .map_err(|e| {
        error!("search task failed: {}", e);
        ApiError(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to search blood banks".to_string(),
            "internal",
        )
    })??;

    info!(
        location = %location,
        found = outcome.facilities.len(),
        "POST /api/blood-banks"
    );

    Ok(Json(SearchResponse {
        success: true,
        location,
        coordinates: outcome.center.into(),
        radius: outcome.radius_km,
        total_found: outcome.facilities.len(),
        centers: outcome.facilities,
    }))
}
