use super::ResultPresenter;
use crate::domain::Facility;
use crate::search::SearchOutcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js";

/// Writes a self-contained Leaflet page: facility markers, a distance-weighted
/// heat layer, the search center and the search radius
pub struct LeafletMap {
    path: PathBuf,
}

impl LeafletMap {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultPresenter for LeafletMap {
    fn present(&self, outcome: &SearchOutcome, label: &str) -> Result<()> {
        let html = render_html(outcome, label)?;
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create map file: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(html.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct MapData<'a> {
    label: &'a str,
    center: [f64; 2],
    radius_m: f64,
    radius_km: f64,
    markers: Vec<Marker<'a>>,
    /// [lat, lon, weight] triples
    heat: Vec<[f64; 3]>,
}

#[derive(Serialize)]
struct Marker<'a> {
    lat: f64,
    lon: f64,
    name: &'a str,
    address: &'a str,
    phone: &'a str,
    hours: &'a str,
    distance_km: f64,
    facility_type: &'a str,
    website: Option<&'a str>,
}

impl<'a> From<&'a Facility> for Marker<'a> {
    fn from(f: &'a Facility) -> Self {
        Self {
            lat: f.coordinate.lat,
            lon: f.coordinate.lon,
            name: &f.name,
            address: &f.address,
            phone: &f.phone,
            hours: &f.opening_hours,
            distance_km: f.distance_km,
            facility_type: &f.facility_type,
            website: linkable(&f.website),
        }
    }
}

/// Only plain web links become clickable; OSM tags can carry any scheme
fn linkable(url: &str) -> Option<&str> {
    let lower = url.trim_start().to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

/// Render the map page for a search outcome
pub fn render_html(outcome: &SearchOutcome, label: &str) -> Result<String> {
    let data = MapData {
        label,
        center: [outcome.center.lat, outcome.center.lon],
        radius_m: outcome.radius_km * 1000.0,
        radius_km: outcome.radius_km,
        markers: outcome.facilities.iter().map(Marker::from).collect(),
        heat: outcome
            .facilities
            .iter()
            .map(|f| [f.coordinate.lat, f.coordinate.lon, f.heat_weight()])
            .collect(),
    };

    // Keep the payload from closing the surrounding <script> element
    let json = serde_json::to_string(&data)
        .context("Failed to serialize map data")?
        .replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Blood donation centers</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="{LEAFLET_CSS}">
<script src="{LEAFLET_JS}"></script>
<script src="{LEAFLET_HEAT_JS}"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }} .popup h4 {{ color: #d32f2f; margin: 0 0 6px; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {json};
const esc = (s) => String(s).replace(/[&<>"']/g, (c) => ({{"&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"}})[c]);
const map = L.map("map").setView(data.center, 13);
const tiles = L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);

const markers = L.layerGroup(data.markers.map((m) => {{
  const directions = "https://www.google.com/maps/dir/?api=1&destination=" + m.lat + "," + m.lon;
  const website = m.website ? `<p><b>Website:</b> <a href="${{esc(m.website)}}" target="_blank">Visit</a></p>` : "";
  const popup = `<div class="popup" style="width: 300px">
    <h4>${{esc(m.name)}}</h4>
    <p><b>Address:</b> ${{esc(m.address || "Not available")}}</p>
    <p><b>Phone:</b> ${{esc(m.phone)}}</p>
    <p><b>Hours:</b> ${{esc(m.hours)}}</p>
    <p><b>Distance:</b> ${{m.distance_km}} km</p>
    <p><b>Type:</b> ${{esc(m.facility_type)}}</p>
    ${{website}}
    <hr><a href="${{directions}}" target="_blank">Get Directions</a>
  </div>`;
  return L.marker([m.lat, m.lon], {{ title: m.name }}).bindPopup(popup, {{ maxWidth: 300 }});
}})).addTo(map);

const heat = L.heatLayer(data.heat, {{
  minOpacity: 0.3,
  maxZoom: 18,
  radius: 25,
  blur: 15,
  gradient: {{ 0.2: "blue", 0.4: "lime", 0.6: "orange", 1: "red" }}
}}).addTo(map);

L.circleMarker(data.center, {{ color: "green", radius: 8, fillOpacity: 0.9 }})
  .bindPopup("Search Center: " + esc(data.label))
  .bindTooltip("Your Search Location")
  .addTo(map);

const area = L.circle(data.center, {{
  radius: data.radius_m,
  color: "green",
  weight: 2,
  fill: true,
  fillColor: "green",
  fillOpacity: 0.1
}}).bindPopup("Search Radius: " + data.radius_km + " km").addTo(map);

L.control.layers({{ "OpenStreetMap": tiles }}, {{
  "Blood centers": markers,
  "Heatmap": heat,
  "Search radius": area
}}).addTo(map);
</script>
</body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, NOT_AVAILABLE};
    use std::fs;
    use tempfile::tempdir;

    fn outcome() -> SearchOutcome {
        SearchOutcome {
            center: Coordinate::new(12.97, 77.59),
            radius_km: 5.0,
            facilities: vec![
                Facility {
                    name: "Red Cross </script> Blood Bank".to_string(),
                    address: String::new(),
                    phone: NOT_AVAILABLE.to_string(),
                    coordinate: Coordinate::new(12.971, 77.595),
                    distance_km: 0.55,
                    opening_hours: NOT_AVAILABLE.to_string(),
                    website: "https://redcross.example.org".to_string(),
                    facility_type: "blood_bank".to_string(),
                },
                Facility {
                    name: "Victoria Hospital".to_string(),
                    address: "Fort Road, Bengaluru".to_string(),
                    phone: NOT_AVAILABLE.to_string(),
                    coordinate: Coordinate::new(12.96, 77.57),
                    distance_km: 12.0,
                    opening_hours: NOT_AVAILABLE.to_string(),
                    website: NOT_AVAILABLE.to_string(),
                    facility_type: "hospital".to_string(),
                },
            ],
        }
    }

    fn embedded_data(html: &str) -> serde_json::Value {
        let start = html.find("const data = ").unwrap() + "const data = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        serde_json::from_str(&html[start..end].replace("<\\/", "</")).unwrap()
    }

    #[test]
    fn test_heat_weights_and_radius() {
        let html = render_html(&outcome(), "Bengaluru, India").unwrap();
        let data = embedded_data(&html);

        assert_eq!(data["radius_m"], 5000.0);
        assert!((data["heat"][0][2].as_f64().unwrap() - 9.45).abs() < 1e-9);
        assert_eq!(data["heat"][1][2], 1.0);
        assert_eq!(data["markers"][0]["website"], "https://redcross.example.org");
        assert!(data["markers"][1]["website"].is_null());
        assert_eq!(data["label"], "Bengaluru, India");
    }

    #[test]
    fn test_payload_cannot_close_script() {
        let html = render_html(&outcome(), "x").unwrap();
        // Two loader tags plus the inline script; the facility name stays escaped
        assert_eq!(html.matches("</script>").count(), 3);
    }

    #[test]
    fn test_present_writes_file() {
        let dir = tempdir().unwrap();
        let map = LeafletMap::new(dir.path().join("map.html"));

        map.present(&outcome(), "Bengaluru").unwrap();

        let contents = fs::read_to_string(map.path()).unwrap();
        assert!(contents.starts_with("<!DOCTYPE html>"));
        assert!(contents.contains("L.heatLayer"));
    }

    #[test]
    fn test_only_web_links_are_clickable() {
        let mut outcome = outcome();
        outcome.facilities[0].website = "javascript:alert(1)".to_string();
        outcome.facilities[1].website = "HTTP://victoria.example.org".to_string();

        let data = embedded_data(&render_html(&outcome, "x").unwrap());
        assert!(data["markers"][0]["website"].is_null());
        assert_eq!(data["markers"][1]["website"], "HTTP://victoria.example.org");
    }
}
