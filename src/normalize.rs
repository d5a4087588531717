//! Normalization of external tour-optimizer responses.
//!
//! The external optimizer returns tours of "visits" that reference
//! shipment indices into the stop list that was submitted to it. This
//! module resolves those indices back to local [`Stop`] records, enforces
//! the distance ceiling (salvaging long tours by midpoint splitting where
//! possible), and reports acceptance counts so the caller can decide
//! whether to warn the user or fall back to the deterministic clusterer.
//!
//! Malformed input never panics or errors here: an unrecognized shape
//! deserializes to zero tours, which the caller treats as "optimizer
//! unavailable".

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Depot, Route, Stop};

/// Minimum acceptance ratio before a plan is flagged as degraded.
const MIN_ACCEPTANCE_RATIO: f64 = 0.6;

/// Stops below which an over-long tour is dropped instead of salvaged.
const MIN_SALVAGE_STOPS: usize = 5;

/// Conservative per-stop distance estimate for salvaged sub-routes, in km.
const SALVAGE_KM_PER_STOP: f64 = 6.0;

// ============================================================================
// Response Schema
// ============================================================================

/// A single visit within an external tour.
///
/// Visits without a shipment index are vehicle start/end anchors, not
/// stops, and are discarded during resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalVisit {
    #[serde(default)]
    pub shipment_index: Option<usize>,
}

/// Per-tour metrics reported by the external optimizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourMetrics {
    #[serde(default)]
    pub travel_distance_meters: Option<f64>,
}

/// One proposed vehicle tour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalTour {
    #[serde(default)]
    pub visits: Vec<ExternalVisit>,
    #[serde(default)]
    pub metrics: Option<TourMetrics>,
}

/// A complete external optimizer response.
///
/// Every field defaults, so a response of any other shape deserializes to
/// zero tours rather than failing mid-parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalResponse {
    #[serde(default)]
    pub tours: Vec<ExternalTour>,
}

impl ExternalResponse {
    /// Parse a raw JSON response.
    ///
    /// Unparseable or unrecognized input yields an empty response (zero
    /// tours), by contract; it never returns an error.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(response) => response,
            Err(err) => {
                warn!("unusable optimizer response ({err}), treating as zero tours");
                Self::default()
            }
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Acceptance accounting for one normalization pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Tours present in the response
    pub total_tours: usize,
    /// Tours accepted as-is
    pub accepted: usize,
    /// Tours dropped for exceeding the distance ceiling with too few stops
    pub dropped_for_distance: usize,
    /// Over-ceiling tours recovered by midpoint splitting
    pub salvaged: usize,
}

impl NormalizeReport {
    /// Fraction of tours that produced at least one route.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.total_tours == 0 {
            return 0.0;
        }
        (self.accepted + self.salvaged) as f64 / self.total_tours as f64
    }

    /// True when acceptance is low enough that the caller should warn the
    /// user. A signal, not a hard failure.
    pub fn is_degraded(&self) -> bool {
        self.acceptance_ratio() < MIN_ACCEPTANCE_RATIO
    }
}

/// Routes plus acceptance accounting from one normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub routes: Vec<Route>,
    pub report: NormalizeReport,
}

/// Map an external response back onto local stop and depot records.
///
/// `submitted_stops` must be exactly the (filtered) stop list that was
/// submitted to the optimizer: visits resolve by index alignment against
/// it. For each tour:
///
/// - anchor visits (no shipment index) and out-of-range indices are skipped;
/// - tours resolving to zero stops are dropped (empty vehicle assignments);
/// - tours whose reported distance exceeds `max_tour_distance_km` are
///   salvaged into two halves (suffix `-1`/`-2`, estimated distance,
///   flagged salvaged) when they carry at least [`MIN_SALVAGE_STOPS`]
///   stops, and dropped with a warning otherwise.
///
/// Bus ids and depots are assigned deterministically from the tour index;
/// depots round-robin over `depots`.
pub fn normalize_response(
    response: &ExternalResponse,
    submitted_stops: &[Stop],
    depots: &[Depot],
    capacity: u32,
    max_tour_distance_km: f64,
) -> NormalizeOutcome {
    let mut routes = Vec::new();
    let mut report = NormalizeReport {
        total_tours: response.tours.len(),
        ..Default::default()
    };

    if depots.is_empty() {
        warn!("no depots available, treating response as zero usable tours");
        return NormalizeOutcome { routes, report };
    }

    for (tour_index, tour) in response.tours.iter().enumerate() {
        let stops = resolve_tour_stops(tour, submitted_stops);
        if stops.is_empty() {
            continue;
        }

        let depot = depots[tour_index % depots.len()].clone();
        let distance_km = tour
            .metrics
            .as_ref()
            .and_then(|m| m.travel_distance_meters)
            .unwrap_or(0.0)
            / 1000.0;

        if distance_km > max_tour_distance_km {
            if stops.len() >= MIN_SALVAGE_STOPS {
                routes.extend(salvage_tour(
                    stops,
                    depot,
                    tour_index,
                    capacity,
                    max_tour_distance_km,
                ));
                report.salvaged += 1;
            } else {
                warn!(
                    "tour {} exceeds {:.0}km ({:.1}km) with only {} stops, dropping",
                    tour_index + 1,
                    max_tour_distance_km,
                    distance_km,
                    stops.len()
                );
                report.dropped_for_distance += 1;
            }
            continue;
        }

        let mut route = Route::new(&format!("Bus {}", tour_index + 1), depot, stops, capacity);
        route.distance_km = distance_km;
        routes.push(route);
        report.accepted += 1;
    }

    NormalizeOutcome { routes, report }
}

/// Resolve a tour's visits to stops, index-aligned with the submitted list.
fn resolve_tour_stops(tour: &ExternalTour, submitted_stops: &[Stop]) -> Vec<Stop> {
    let mut stops = Vec::new();
    for visit in &tour.visits {
        let Some(index) = visit.shipment_index else {
            continue; // vehicle start/end anchor
        };
        match submitted_stops.get(index) {
            Some(stop) => stops.push(stop.clone()),
            None => warn!("visit references unknown shipment index {index}, skipping"),
        }
    }
    stops
}

/// Recover two sub-routes from an over-long tour by splitting its stop list
/// at the midpoint.
///
/// Each half gets a conservative estimated distance capped below the
/// ceiling; the real distance is unknown once the tour is cut.
fn salvage_tour(
    stops: Vec<Stop>,
    depot: Depot,
    tour_index: usize,
    capacity: u32,
    max_tour_distance_km: f64,
) -> Vec<Route> {
    let midpoint = stops.len().div_ceil(2);
    let (first, second) = stops.split_at(midpoint);

    let halves = [first, second];
    let mut salvaged = Vec::new();

    for (half_index, half) in halves.iter().enumerate() {
        if half.is_empty() {
            continue;
        }
        let bus_id = format!("Bus {}-{}", tour_index + 1, half_index + 1);
        let mut route = Route::new(&bus_id, depot.clone(), half.to_vec(), capacity);
        route.distance_km =
            (max_tour_distance_km - 5.0).min(half.len() as f64 * SALVAGE_KM_PER_STOP);
        route.is_salvaged = true;
        salvaged.push(route);
    }

    warn!(
        "salvaged {} sub-routes from over-long tour {}",
        salvaged.len(),
        tour_index + 1
    );

    salvaged
}
