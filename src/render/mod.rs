//! Presentation of ranked results as an interactive map.

pub mod leaflet;

pub use leaflet::{LeafletMap, render_html};

use crate::search::SearchOutcome;
use anyhow::Result;

/// Consumes a finished search and produces some viewable artifact
pub trait ResultPresenter {
    fn present(&self, outcome: &SearchOutcome, label: &str) -> Result<()>;
}
