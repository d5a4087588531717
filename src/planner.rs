//! Plan orchestration.
//!
//! [`RoutePlanner`] owns the immutable stop/depot inputs and wires the
//! pipeline together: radius filter, then either normalization of an
//! external optimizer response (primary) or directional clustering
//! (fallback), then capacity splitting, sequencing and metrics. Each call
//! takes fresh inputs and returns a fresh [`PlanOutcome`]; there is no
//! shared mutable state between runs, so concurrent plans are safe.
//!
//! The planner never performs I/O. Fetching the external response, with
//! its retries and timeouts, is the API client's responsibility; the
//! planner only consumes an already materialized [`ExternalResponse`].

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cluster::{cluster_bearing, cluster_by_sector, Cluster};
use crate::filter::{filter_by_radius, FilterOutcome};
use crate::geo_utils::{bearing_degrees, bearing_difference, haversine_distance_km};
use crate::metrics::{compute_metrics, RouteMetrics};
use crate::normalize::{normalize_response, ExternalResponse};
use crate::sequence::nearest_neighbor_order;
use crate::split::split_over_capacity;
use crate::{
    Depot, DepotRecord, DepotStrategy, Diagnostics, GeoPoint, PlanConfig, PlanError, PlanOutcome,
    PlanSource, Result, Route, Stop, StopRecord,
};

/// Route planner over a fixed set of stops and depots.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    stops: Vec<Stop>,
    depots: Vec<Depot>,
    config: PlanConfig,
}

impl RoutePlanner {
    /// Create a planner from validated stops and depots.
    ///
    /// Fails fast on empty inputs or a zero capacity, before any planning.
    pub fn new(stops: Vec<Stop>, depots: Vec<Depot>, config: PlanConfig) -> Result<Self> {
        if stops.is_empty() {
            return Err(PlanError::EmptyStops);
        }
        if depots.is_empty() {
            return Err(PlanError::EmptyDepots);
        }
        if config.capacity == 0 {
            return Err(PlanError::InvalidCapacity {
                capacity: config.capacity,
            });
        }
        Ok(Self {
            stops,
            depots,
            config,
        })
    }

    /// Create a planner from raw ingestion records.
    ///
    /// Conversion rejects the first malformed record (non-finite or
    /// out-of-range coordinate, negative student count); nothing is
    /// partially processed.
    pub fn from_records(
        stop_records: Vec<StopRecord>,
        depot_records: Vec<DepotRecord>,
        config: PlanConfig,
    ) -> Result<Self> {
        let stops = stop_records
            .into_iter()
            .map(Stop::try_from)
            .collect::<Result<Vec<_>>>()?;
        let depots = depot_records
            .into_iter()
            .map(Depot::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(stops, depots, config)
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    /// The radius-filtered stop list for `origin`, in input order.
    ///
    /// This is exactly the list an external optimizer should be given:
    /// [`normalize_response`] resolves shipment indices against it.
    pub fn filtered_stops(&self, origin: GeoPoint) -> FilterOutcome {
        filter_by_radius(&self.stops, &origin, self.config.max_radius_km)
    }

    /// Plan routes, preferring the external response when it yields usable
    /// routes and falling back to directional clustering otherwise.
    ///
    /// The fallback decision is made here, not inside the normalizer: the
    /// normalizer only guarantees it degrades to zero routes on malformed
    /// input. A fallback after a failed external attempt is flagged
    /// degraded so the caller can warn the user.
    pub fn plan(&self, origin: GeoPoint, external: Option<&ExternalResponse>) -> PlanOutcome {
        if let Some(response) = external {
            let outcome = self.plan_from_external(origin, response);
            if !outcome.routes.is_empty() {
                return outcome;
            }
            warn!("external optimizer yielded no usable routes, falling back to clustering");
            let mut fallback = self.plan_fallback(origin);
            fallback.diagnostics.total_tours = outcome.diagnostics.total_tours;
            fallback.diagnostics.dropped_tours = outcome.diagnostics.dropped_tours;
            fallback.diagnostics.degraded = true;
            return fallback;
        }
        self.plan_fallback(origin)
    }

    /// Deterministic fallback: directional clustering of the filtered stops.
    ///
    /// Clusters become routes with sequential bus ids ("Bus 1", "Bus 2",
    /// ...), nearest-neighbor stop order, a depot per the configured
    /// strategy and a recomputed pickup-leg distance. At most
    /// `max_fleet_size` routes are emitted; overflow is counted in the
    /// diagnostics.
    pub fn plan_fallback(&self, origin: GeoPoint) -> PlanOutcome {
        let mut diagnostics = Diagnostics::empty(PlanSource::FallbackClusterer);

        let filtered = self.filtered_stops(origin);
        diagnostics.excluded_stops = filtered.excluded.iter().map(|s| s.id.clone()).collect();

        let mut clusters = cluster_by_sector(&filtered.kept, &origin, self.config.capacity);
        if clusters.len() > self.config.max_fleet_size {
            diagnostics.truncated_routes = clusters.len() - self.config.max_fleet_size;
            warn!(
                "{} clusters exceed the fleet cap of {}, truncating",
                clusters.len(),
                self.config.max_fleet_size
            );
            clusters.truncate(self.config.max_fleet_size);
        }

        let routes = self.routes_from_clusters(&clusters, origin);
        debug!("fallback plan produced {} routes", routes.len());

        PlanOutcome {
            routes,
            diagnostics,
        }
    }

    /// Primary path: normalize an external optimizer response.
    ///
    /// Within-capacity routes get a nearest-neighbor re-sequence;
    /// over-capacity routes are split order-preservingly into sub-routes.
    /// Either way the route's distance is recomputed from its final stop
    /// sequence, since the reported tour distance matches the optimizer's
    /// visiting order, not ours. An empty or malformed response
    /// deterministically yields zero routes.
    pub fn plan_from_external(&self, origin: GeoPoint, response: &ExternalResponse) -> PlanOutcome {
        let mut diagnostics = Diagnostics::empty(PlanSource::External);

        let filtered = self.filtered_stops(origin);
        diagnostics.excluded_stops = filtered.excluded.iter().map(|s| s.id.clone()).collect();

        let normalized = normalize_response(
            response,
            &filtered.kept,
            &self.depots,
            self.config.capacity,
            self.config.max_tour_distance_km,
        );

        diagnostics.total_tours = normalized.report.total_tours;
        diagnostics.accepted_tours = normalized.report.accepted;
        diagnostics.dropped_tours = normalized.report.dropped_for_distance;
        diagnostics.salvaged_tours = normalized.report.salvaged;
        diagnostics.degraded = normalized.report.is_degraded();

        let mut routes = Vec::new();
        for route in normalized.routes {
            if route.total_students > self.config.capacity {
                for mut sub in split_over_capacity(route, self.config.capacity) {
                    // Reported tour distance no longer applies to a cut route
                    sub.distance_km = self.route_metrics(&sub, origin).distance_km;
                    routes.push(sub);
                }
            } else {
                let mut route = route;
                route.stops = nearest_neighbor_order(&route.stops, &origin);
                route.distance_km = self.route_metrics(&route, origin).distance_km;
                routes.push(route);
            }
        }

        PlanOutcome {
            routes,
            diagnostics,
        }
    }

    /// Metrics for one route departing from `origin`, using the configured
    /// capacity, speed and service time.
    pub fn route_metrics(&self, route: &Route, origin: GeoPoint) -> RouteMetrics {
        compute_metrics(
            route,
            &origin,
            self.config.capacity,
            self.config.average_speed_kmh,
            self.config.stop_service_minutes,
        )
    }

    fn routes_from_clusters(&self, clusters: &[Cluster], origin: GeoPoint) -> Vec<Route> {
        #[cfg(feature = "parallel")]
        let sequenced: Vec<Vec<Stop>> = clusters
            .par_iter()
            .map(|c| nearest_neighbor_order(&c.stops, &origin))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let sequenced: Vec<Vec<Stop>> = clusters
            .iter()
            .map(|c| nearest_neighbor_order(&c.stops, &origin))
            .collect();

        clusters
            .iter()
            .zip(sequenced)
            .enumerate()
            .map(|(index, (cluster, stops))| {
                let depot = self.choose_depot(cluster, origin, index);
                let bus_id = format!("Bus {}", index + 1);
                let mut route = Route::new(&bus_id, depot, stops, self.config.capacity);
                route.distance_km = self.route_metrics(&route, origin).distance_km;
                route
            })
            .collect()
    }

    /// Pick a depot for a fallback route.
    ///
    /// Round-robin indexes the depot list by route position. The
    /// bearing-aligned strategy scores every depot by direction alignment
    /// with the cluster (weighted double) plus proximity to the cluster
    /// centroid, and takes the best; ties keep the earliest depot.
    fn choose_depot(&self, cluster: &Cluster, origin: GeoPoint, route_index: usize) -> Depot {
        match self.config.depot_strategy {
            DepotStrategy::RoundRobin => self.depots[route_index % self.depots.len()].clone(),
            DepotStrategy::BearingAligned => {
                let centroid = cluster.centroid();
                let target_bearing = cluster_bearing(cluster, &origin);

                let mut best = &self.depots[0];
                let mut best_score = f64::NEG_INFINITY;

                for depot in &self.depots {
                    let depot_bearing = bearing_degrees(&origin, &depot.point);
                    let alignment = 100.0 - bearing_difference(depot_bearing, target_bearing);
                    let proximity =
                        (50.0 - haversine_distance_km(&centroid, &depot.point)).max(0.0);
                    let score = alignment * 2.0 + proximity;
                    if score > best_score {
                        best_score = score;
                        best = depot;
                    }
                }
                best.clone()
            }
        }
    }
}
