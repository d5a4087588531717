//! Splitting of over-capacity routes into capacity-feasible sub-routes.
//!
//! Routes can arrive over capacity when they originate from an external
//! optimizer tour that was not capacity-validated. Capacity violations are
//! always resolved here, never surfaced as errors.

use log::warn;

use crate::{Route, Stop};

/// Split a route whose load exceeds `capacity` into capacity-feasible
/// sub-routes, preserving the original stop order.
///
/// The stop sequence is walked in order, accumulating into the current
/// sub-route while capacity allows; on overflow the sub-route is closed and
/// a new one named `{bus_id}_{n}` (n 1-based) is opened. The first
/// sub-route keeps the original bus id. Derived fields are recomputed for
/// every sub-route; distances are left at zero for the caller to refresh.
///
/// Concatenating the sub-routes' stop sequences yields exactly the original
/// sequence: no reordering, no loss, no duplication. A route already within
/// capacity is returned as-is.
pub fn split_over_capacity(route: Route, capacity: u32) -> Vec<Route> {
    if route.total_students <= capacity {
        return vec![route];
    }

    warn!(
        "route '{}' carries {} students over capacity {}, splitting",
        route.bus_id, route.total_students, capacity
    );

    let original_id = route.bus_id.clone();
    let make_sub = |bus_id: &str, stops: Vec<Stop>| {
        let mut sub = Route::new(bus_id, route.depot.clone(), stops, capacity);
        sub.is_salvaged = route.is_salvaged;
        sub
    };

    let mut sub_routes: Vec<Route> = Vec::new();
    let mut current_stops: Vec<Stop> = Vec::new();
    let mut current_load: u32 = 0;

    for stop in &route.stops {
        if !current_stops.is_empty() && current_load + stop.students > capacity {
            let bus_id = if sub_routes.is_empty() {
                original_id.clone()
            } else {
                format!("{}_{}", original_id, sub_routes.len())
            };
            sub_routes.push(make_sub(&bus_id, std::mem::take(&mut current_stops)));
            current_load = 0;
        }
        current_load += stop.students;
        current_stops.push(stop.clone());
    }

    if !current_stops.is_empty() {
        let bus_id = if sub_routes.is_empty() {
            original_id.clone()
        } else {
            format!("{}_{}", original_id, sub_routes.len())
        };
        sub_routes.push(make_sub(&bus_id, current_stops));
    }

    sub_routes
}
