use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::geometry::BboxMode;
use crate::search::KeywordRules;

pub const USER_AGENT: &str = concat!("bloodfind/", env!("CARGO_PKG_VERSION"));

/// Maximum number of facilities returned by a search
pub const MAX_RESULTS: usize = 10;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}
fn default_max_results() -> usize {
    MAX_RESULTS
}
fn default_map() -> PathBuf {
    PathBuf::from("blood_centers_heatmap.html")
}
fn default_verbose() -> bool {
    false
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_map")]
    pub map: PathBuf,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub bbox_mode: BboxMode,
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub nominatim: NominatimConfig,
    #[serde(default)]
    pub filter: KeywordRules,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            location: None,
            lat: None,
            lon: None,
            radius_km: default_radius_km(),
            map: default_map(),
            verbose: default_verbose(),
            max_results: default_max_results(),
            bbox_mode: BboxMode::default(),
            overpass: OverpassConfig::default(),
            nominatim: NominatimConfig::default(),
            filter: KeywordRules::default(),
        }
    }
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_query_timeout_secs() -> u64 {
    25
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    /// Server-side `[timeout:N]` of the Overpass QL query
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// HTTP transport deadline
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            query_timeout_secs: default_query_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_min_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct NominatimConfig {
    #[serde(default = "default_nominatim_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Minimum spacing between geocoding requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: default_nominatim_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl FileConfig {
    /// Load the first config file found on the search path
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to parse config file");
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named config file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("bloodfind.toml"));
    paths.push(PathBuf::from(".bloodfind.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("bloodfind").join("config.toml"));
        paths.push(config_dir.join("bloodfind.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".bloodfind.toml"));
        paths.push(home.join(".config").join("bloodfind").join("config.toml"));
    }

    paths
}
