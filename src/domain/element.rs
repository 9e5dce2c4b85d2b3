use super::Coordinate;
use std::collections::HashMap;

/// OSM tag map of a single element
pub type Tags = HashMap<String, String>;

/// OSM element kind as reported by Overpass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    /// Map the Overpass `type` field to an element kind
    pub fn from_type_tag(tag: &str) -> Option<ElementKind> {
        match tag {
            "node" => Some(ElementKind::Node),
            "way" => Some(ElementKind::Way),
            "relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }
}

/// A candidate returned by the tag query, with its representative point resolved
#[derive(Debug, Clone)]
pub struct RawElement {
    pub kind: ElementKind,
    pub id: u64,
    /// Node position, or the aggregate center for ways and relations
    pub point: Coordinate,
    pub tags: Tags,
}

impl RawElement {
    pub fn new(kind: ElementKind, id: u64, point: Coordinate, tags: Tags) -> Self {
        Self {
            kind,
            id,
            point,
            tags,
        }
    }

    /// Tag value, treating empty strings as absent
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}
