//! Radius filtering of stops around the planning origin.

use log::warn;

use crate::geo_utils::haversine_distance_km;
use crate::{GeoPoint, Stop};

/// Result of partitioning stops by distance from the origin.
///
/// Both sides preserve the input order. Excluded stops stay visible to the
/// caller so they are never silently lost.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Stops within the radius, in input order
    pub kept: Vec<Stop>,
    /// Stops beyond the radius, in input order
    pub excluded: Vec<Stop>,
}

/// Partition `stops` into those within `max_radius_km` of `origin` and
/// those beyond it.
///
/// A stop is kept iff its haversine distance from the origin is at most
/// the radius. Pure partition: no reordering, no mutation.
pub fn filter_by_radius(stops: &[Stop], origin: &GeoPoint, max_radius_km: f64) -> FilterOutcome {
    let mut kept = Vec::with_capacity(stops.len());
    let mut excluded = Vec::new();

    for stop in stops {
        let distance = haversine_distance_km(origin, &stop.point);
        if distance <= max_radius_km {
            kept.push(stop.clone());
        } else {
            warn!(
                "stop '{}' is {:.1}km from origin (limit {:.0}km), excluding",
                stop.id, distance, max_radius_km
            );
            excluded.push(stop.clone());
        }
    }

    FilterOutcome { kept, excluded }
}
