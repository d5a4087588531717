//! Synthetic stop-field generator for stress testing and benchmarking.
//!
//! Generates deterministic sets of stops scattered around an origin, with
//! configurable directional corridors so clustering behavior can be
//! validated against known ground truth.
//!
//! Feature-gated behind `synthetic` — not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use busplan::synthetic::StopFieldScenario;
//! use busplan::GeoPoint;
//!
//! let scenario = StopFieldScenario {
//!     origin: GeoPoint::new(13.0089, 80.0035),
//!     stop_count: 200,
//!     max_radius_km: 35.0,
//!     min_students: 5,
//!     max_students: 40,
//!     corridor_bearings: vec![0.0, 90.0, 225.0],
//!     seed: 42,
//! };
//!
//! let stops = scenario.generate();
//! assert_eq!(stops.len(), 200);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{GeoPoint, Stop};

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Scenario configuration for generating a synthetic stop field.
#[derive(Debug, Clone)]
pub struct StopFieldScenario {
    /// Origin all stops scatter around (the school).
    pub origin: GeoPoint,
    /// Number of stops to generate.
    pub stop_count: usize,
    /// Maximum distance from the origin in km.
    pub max_radius_km: f64,
    /// Minimum students per stop (inclusive).
    pub min_students: u32,
    /// Maximum students per stop (inclusive).
    pub max_students: u32,
    /// Preferred bearings; stops cluster within ±20° of one of these.
    /// Empty means uniformly random bearings.
    pub corridor_bearings: Vec<f64>,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl StopFieldScenario {
    /// Generate the stop field. Deterministic for a given scenario.
    pub fn generate(&self) -> Vec<Stop> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut stops = Vec::with_capacity(self.stop_count);

        for index in 0..self.stop_count {
            let bearing = if self.corridor_bearings.is_empty() {
                rng.gen_range(0.0..360.0)
            } else {
                let corridor = self.corridor_bearings[index % self.corridor_bearings.len()];
                (corridor + rng.gen_range(-20.0..20.0)).rem_euclid(360.0)
            };

            // Bias toward the origin so dense suburbs outnumber far villages
            let distance_km = self.max_radius_km * rng.gen_range(0.05..1.0_f64).sqrt();
            let point = offset_point(&self.origin, bearing, distance_km);
            let students = rng.gen_range(self.min_students..=self.max_students);

            stops.push(Stop::new(&format!("stop-{}", index + 1), point, students));
        }

        stops
    }
}

/// Move `distance_km` from `origin` along `bearing` using a local
/// equirectangular approximation. Good enough at stop-field scales.
fn offset_point(origin: &GeoPoint, bearing: f64, distance_km: f64) -> GeoPoint {
    let bearing_rad = bearing.to_radians();
    let distance_m = distance_km * 1000.0;

    let d_lat = distance_m * bearing_rad.cos() / METERS_PER_DEGREE_LAT;
    let meters_per_degree_lng = METERS_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
    let d_lng = distance_m * bearing_rad.sin() / meters_per_degree_lng;

    GeoPoint::new(origin.latitude + d_lat, origin.longitude + d_lng)
}
