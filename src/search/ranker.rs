use crate::domain::Facility;

/// Stable ascending sort by distance, truncated to `limit`.
///
/// Equal distances keep their discovery order.
pub fn rank(mut facilities: Vec<Facility>, limit: usize) -> Vec<Facility> {
    facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    facilities.truncate(limit);
    facilities
}
