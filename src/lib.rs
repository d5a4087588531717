//! # busplan
//!
//! Capacity-feasible school-bus route construction engine.
//!
//! This library provides:
//! - Great-circle geo math (haversine distance, bearings, compass sectors)
//! - Radius filtering of stops around an origin
//! - Directional (bearing-sector) clustering with greedy capacity packing
//! - Nearest-neighbor stop sequencing
//! - Deterministic splitting of over-capacity routes
//! - Normalization of external tour-optimizer responses, with distance
//!   filtering and salvage of over-long tours
//! - Per-route distance/time/efficiency metrics
//!
//! ## Features
//!
//! - **`parallel`** - Sequence routes of a plan in parallel with rayon
//! - **`synthetic`** - Seeded synthetic stop-field generator for tests/benches
//!
//! ## Quick Start
//!
//! ```rust
//! use busplan::{Depot, GeoPoint, PlanConfig, RoutePlanner, Stop};
//!
//! let origin = GeoPoint::new(13.0089, 80.0035);
//! let stops = vec![
//!     Stop::new("stop-1", GeoPoint::new(13.05, 80.0035), 20),
//!     Stop::new("stop-2", GeoPoint::new(13.10, 80.0035), 20),
//!     Stop::new("stop-3", GeoPoint::new(13.15, 80.0035), 20),
//! ];
//! let depots = vec![Depot::new("North Yard", GeoPoint::new(13.20, 80.0))];
//!
//! let planner = RoutePlanner::new(stops, depots, PlanConfig::default()).unwrap();
//! let outcome = planner.plan_fallback(origin);
//!
//! for route in &outcome.routes {
//!     println!("{}: {} students", route.bus_id, route.total_students);
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{PlanError, Result};

// Geographic utilities (distance, bearing, sector assignment)
pub mod geo_utils;
pub use geo_utils::Sector;

// Radius filtering of stops around the origin
pub mod filter;
pub use filter::{filter_by_radius, FilterOutcome};

// Directional clustering with greedy capacity packing
pub mod cluster;
pub use cluster::{cluster_by_sector, Cluster};

// Nearest-neighbor stop sequencing
pub mod sequence;
pub use sequence::nearest_neighbor_order;

// Capacity-violation splitting
pub mod split;
pub use split::split_over_capacity;

// External optimizer response normalization
pub mod normalize;
pub use normalize::{
    normalize_response, ExternalResponse, ExternalTour, ExternalVisit, NormalizeOutcome,
    NormalizeReport, TourMetrics,
};

// Route metrics (distance, time, efficiency)
pub mod metrics;
pub use metrics::{compute_metrics, RouteMetrics};

// Plan orchestration (filter -> cluster/normalize -> split -> sequence)
pub mod planner;
pub use planner::RoutePlanner;

// Synthetic stop-field generator for stress testing and benchmarking
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use busplan::GeoPoint;
/// let point = GeoPoint::new(13.0089, 80.0035);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has finite, in-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A pickup stop with a student count.
///
/// Stops are immutable inputs: the engine only references them from routes
/// and never mutates them after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Unique identifier for the stop
    pub id: String,
    /// Geographic location (snapped to the road network upstream)
    pub point: GeoPoint,
    /// Number of students boarding at this stop
    pub students: u32,
    /// Opaque passthrough metadata (road name/type, etc.)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Stop {
    /// Create a stop without metadata.
    pub fn new(id: &str, point: GeoPoint, students: u32) -> Self {
        Self {
            id: id.to_string(),
            point,
            students,
            metadata: HashMap::new(),
        }
    }
}

/// Raw stop record as supplied by an ingestion collaborator (CSV, JSON).
///
/// Converted to a [`Stop`] via `TryFrom`, which rejects non-finite or
/// out-of-range coordinates and negative student counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRecord {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub students: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TryFrom<StopRecord> for Stop {
    type Error = PlanError;

    fn try_from(record: StopRecord) -> Result<Self> {
        let point = GeoPoint::new(record.latitude, record.longitude);
        if !point.is_valid() {
            return Err(PlanError::InvalidCoordinate {
                id: record.id,
                latitude: record.latitude,
                longitude: record.longitude,
            });
        }
        if record.students < 0 {
            return Err(PlanError::InvalidStudentCount {
                stop_id: record.id,
                count: record.students,
            });
        }
        Ok(Stop {
            id: record.id,
            point,
            students: record.students as u32,
            metadata: record.metadata,
        })
    }
}

/// A bus parking depot. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub name: String,
    pub point: GeoPoint,
    /// Optional parking capacity hint; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_hint: Option<u32>,
}

impl Depot {
    /// Create a depot without a capacity hint.
    pub fn new(name: &str, point: GeoPoint) -> Self {
        Self {
            name: name.to_string(),
            point,
            capacity_hint: None,
        }
    }
}

/// Raw depot record as supplied by an ingestion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub capacity_hint: Option<i64>,
}

impl TryFrom<DepotRecord> for Depot {
    type Error = PlanError;

    fn try_from(record: DepotRecord) -> Result<Self> {
        let point = GeoPoint::new(record.latitude, record.longitude);
        if !point.is_valid() {
            return Err(PlanError::InvalidCoordinate {
                id: record.name,
                latitude: record.latitude,
                longitude: record.longitude,
            });
        }
        Ok(Depot {
            name: record.name,
            point,
            capacity_hint: record.capacity_hint.and_then(|c| u32::try_from(c).ok()),
        })
    }
}

/// An ordered sequence of stops assigned to one vehicle.
///
/// `stops` is the authoritative visiting order. `total_students` and
/// `efficiency` are derived and recomputed on every mutation; construct
/// routes through [`Route::new`] or call [`Route::recompute`] after editing
/// `stops` so the sum invariant holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Bus identifier, unique within one plan (e.g. "Bus 3", "Bus 3_1")
    pub bus_id: String,
    /// Assigned depot
    pub depot: Depot,
    /// Stops in visiting order
    pub stops: Vec<Stop>,
    /// Sum of student counts over `stops` (derived)
    pub total_students: u32,
    /// Route distance in km: haversine pickup-leg path for locally built
    /// routes, reported or estimated for externally optimized ones
    pub distance_km: f64,
    /// `total_students / capacity` (derived)
    pub efficiency: f64,
    /// True when this route was salvaged from an over-long external tour
    #[serde(default)]
    pub is_salvaged: bool,
}

impl Route {
    /// Create a route, deriving `total_students` and `efficiency`.
    pub fn new(bus_id: &str, depot: Depot, stops: Vec<Stop>, capacity: u32) -> Self {
        let mut route = Self {
            bus_id: bus_id.to_string(),
            depot,
            stops,
            total_students: 0,
            distance_km: 0.0,
            efficiency: 0.0,
            is_salvaged: false,
        };
        route.recompute(capacity);
        route
    }

    /// Recompute the derived fields from the current stop sequence.
    pub fn recompute(&mut self, capacity: u32) {
        self.total_students = self.stops.iter().map(|s| s.students).sum();
        self.efficiency = if capacity > 0 {
            f64::from(self.total_students) / f64::from(capacity)
        } else {
            0.0
        };
    }
}

/// Configuration for route planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Seats per bus; all vehicles are homogeneous.
    /// Default: 55
    pub capacity: u32,

    /// Stops farther than this from the origin are excluded before planning.
    /// Default: 40.0 km
    pub max_radius_km: f64,

    /// Externally proposed tours longer than this are salvaged or dropped.
    /// Default: 50.0 km
    pub max_tour_distance_km: f64,

    /// Average bus speed for time estimates.
    /// Default: 25.0 km/h (city traffic)
    pub average_speed_kmh: f64,

    /// Boarding time per stop for time estimates.
    /// Default: 5.0 minutes
    pub stop_service_minutes: f64,

    /// Maximum number of fallback routes emitted by one plan.
    /// Default: 16
    pub max_fleet_size: usize,

    /// How depots are assigned to fallback routes.
    /// Default: round-robin
    pub depot_strategy: DepotStrategy,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            capacity: 55,
            max_radius_km: 40.0,
            max_tour_distance_km: 50.0,
            average_speed_kmh: 25.0,
            stop_service_minutes: 5.0,
            max_fleet_size: 16,
            depot_strategy: DepotStrategy::RoundRobin,
        }
    }
}

/// Strategy for assigning depots to fallback routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepotStrategy {
    /// Depot by route index modulo depot count.
    RoundRobin,
    /// Depot scored by bearing alignment with the cluster direction
    /// (weighted double) plus proximity to the cluster centroid.
    BearingAligned,
}

/// Which path produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanSource {
    /// Routes normalized from an external optimizer response.
    External,
    /// Deterministic directional-clusterer fallback.
    FallbackClusterer,
}

/// Diagnostics accompanying every plan.
///
/// Expected infeasibility (over-capacity, over-distance) is reported here,
/// never raised as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Which path produced the routes
    pub source: PlanSource,
    /// Ids of stops excluded by the radius filter
    pub excluded_stops: Vec<String>,
    /// Tours present in the external response
    pub total_tours: usize,
    /// Tours accepted as-is
    pub accepted_tours: usize,
    /// Tours dropped for exceeding the distance ceiling
    pub dropped_tours: usize,
    /// Over-long tours recovered by midpoint splitting
    pub salvaged_tours: usize,
    /// Fallback routes discarded by the fleet-size cap
    pub truncated_routes: usize,
    /// True when the caller should warn the user (fallback used, or
    /// external acceptance below 60%)
    pub degraded: bool,
}

impl Diagnostics {
    pub(crate) fn empty(source: PlanSource) -> Self {
        Self {
            source,
            excluded_stops: Vec::new(),
            total_tours: 0,
            accepted_tours: 0,
            dropped_tours: 0,
            salvaged_tours: 0,
            truncated_routes: 0,
            degraded: false,
        }
    }
}

/// Result of one planning run: an immutable snapshot of routes plus
/// diagnostics. Consumers must not mutate it; a new run fully replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub routes: Vec<Route>,
    pub diagnostics: Diagnostics,
}
