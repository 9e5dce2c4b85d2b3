use crate::api::OverpassResponse;
use crate::api::overpass::Element;
use crate::domain::{Coordinate, ElementKind, RawElement};
use tracing::debug;

/// Parse Overpass response into candidate elements
///
/// # Algorithm
/// 1. Classify the element type; unknown types are skipped
/// 2. Nodes use their own lat/lon; ways and relations use the `center` emitted by `out center`
/// 3. Elements without a usable point are dropped silently
/// 4. A missing tag map becomes an empty one
pub fn parse_elements(response: &OverpassResponse) -> Vec<RawElement> {
    response.elements.iter().filter_map(to_raw_element).collect()
}

fn to_raw_element(element: &Element) -> Option<RawElement> {
    let kind = ElementKind::from_type_tag(&element.type_)?;

    let point = match kind {
        ElementKind::Node => element.lat.zip(element.lon).map(|(lat, lon)| Coordinate::new(lat, lon)),
        ElementKind::Way | ElementKind::Relation => {
            element.center.map(|c| Coordinate::new(c.lat, c.lon))
        }
    };

    let Some(point) = point else {
        debug!(id = element.id, kind = ?kind, "dropping element without coordinates");
        return None;
    };

    let tags = element.tags.clone().unwrap_or_default();
    Some(RawElement::new(kind, element.id, point, tags))
}
