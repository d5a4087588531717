//! Nearest-neighbor stop sequencing.
//!
//! This is a heuristic, not an optimal TSP solve: it yields a reproducible,
//! deterministic approximation with no guarantee of minimal total distance.
//! Route sizes are capacity-bounded (typically under 60 stops), so the
//! O(n²) scan is fine.

use crate::geo_utils::haversine_distance_km;
use crate::{GeoPoint, Stop};

/// Order `stops` into a visiting sequence by repeated nearest-neighbor
/// selection starting from `origin`.
///
/// At each step the not-yet-visited stop closest to the current position is
/// appended and becomes the new position. Distance ties are broken by
/// first-encountered order in the remaining set, so the result is
/// deterministic for a given input order.
///
/// Sets of two or fewer stops are returned unchanged; there is no
/// reordering benefit.
pub fn nearest_neighbor_order(stops: &[Stop], origin: &GeoPoint) -> Vec<Stop> {
    if stops.len() <= 2 {
        return stops.to_vec();
    }

    let mut remaining: Vec<Stop> = stops.to_vec();
    let mut ordered = Vec::with_capacity(stops.len());
    let mut current = *origin;

    while !remaining.is_empty() {
        let mut nearest_index = 0;
        let mut nearest_distance = f64::INFINITY;

        for (index, stop) in remaining.iter().enumerate() {
            let distance = haversine_distance_km(&current, &stop.point);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest_index = index;
            }
        }

        let next = remaining.remove(nearest_index);
        current = next.point;
        ordered.push(next);
    }

    ordered
}
