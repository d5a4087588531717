//! Per-route distance, time and efficiency metrics.
//!
//! Pure functions of their inputs; calling them twice on the same route
//! yields identical results.

use serde::{Deserialize, Serialize};

use crate::geo_utils::path_distance_km;
use crate::{GeoPoint, Route};

/// Derived metrics for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    /// One-way pickup-leg distance origin → stop 1 → ... → stop n, in km.
    /// No return leg is added; append the origin as a final stop to get a
    /// round trip.
    pub distance_km: f64,
    /// Travel time at the configured average speed plus per-stop service
    /// time, in minutes
    pub estimated_minutes: f64,
    /// Load over capacity (0.0 when capacity is zero)
    pub efficiency: f64,
    /// Number of stops on the route
    pub stops_count: usize,
    /// Mean students per stop (0.0 for empty routes)
    pub avg_students_per_stop: f64,
}

/// Compute metrics for a route departing from `origin`.
///
/// Works for any route regardless of how it was built (fallback clusterer
/// or external optimizer); the distance is always recomputed from the stop
/// sequence, not taken from the route's stored value.
pub fn compute_metrics(
    route: &Route,
    origin: &GeoPoint,
    capacity: u32,
    average_speed_kmh: f64,
    stop_service_minutes: f64,
) -> RouteMetrics {
    let points: Vec<GeoPoint> = route.stops.iter().map(|s| s.point).collect();
    let distance_km = path_distance_km(origin, &points);

    let travel_minutes = if average_speed_kmh > 0.0 {
        (distance_km / average_speed_kmh) * 60.0
    } else {
        0.0
    };
    let estimated_minutes = travel_minutes + route.stops.len() as f64 * stop_service_minutes;

    let efficiency = if capacity > 0 {
        f64::from(route.total_students) / f64::from(capacity)
    } else {
        0.0
    };

    let avg_students_per_stop = if route.stops.is_empty() {
        0.0
    } else {
        f64::from(route.total_students) / route.stops.len() as f64
    };

    RouteMetrics {
        distance_km,
        estimated_minutes,
        efficiency,
        stops_count: route.stops.len(),
        avg_students_per_stop,
    }
}
