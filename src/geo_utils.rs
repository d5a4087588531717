//! Geographic utilities: great-circle distance, bearings, compass sectors.
//!
//! Single source of truth for geo math across the crate; the clusterer,
//! sequencer and metrics all go through these functions.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points in kilometers.
///
/// Returns 0.0 for identical points.
pub fn haversine_distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from `from` to `to`, in degrees [0, 360).
///
/// 0° = north, 90° = east.
pub fn bearing_degrees(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let d_lng = (to.longitude - from.longitude).to_radians();
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// One of eight 45°-wide compass-bearing buckets.
///
/// The declaration order (N first, clockwise to NW) is the deterministic
/// iteration order used by the clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Sector {
    /// All sectors in clockwise order starting from north.
    pub const ALL: [Sector; 8] = [
        Sector::N,
        Sector::NE,
        Sector::E,
        Sector::SE,
        Sector::S,
        Sector::SW,
        Sector::W,
        Sector::NW,
    ];

    /// Assign a bearing to its sector.
    ///
    /// The 22.5° offset centers each 45° sector on its cardinal or
    /// intercardinal direction, so e.g. bearings in [337.5, 22.5) map to N.
    pub fn from_bearing(bearing: f64) -> Self {
        let index = (((bearing + 22.5) % 360.0) / 45.0).floor() as usize;
        Self::ALL[index.min(7)]
    }

    /// Compass label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Sector::N => "N",
            Sector::NE => "NE",
            Sector::E => "E",
            Sector::SE => "SE",
            Sector::S => "S",
            Sector::SW => "SW",
            Sector::W => "W",
            Sector::NW => "NW",
        }
    }

    /// Bearing at the center of this sector, in degrees.
    pub fn center_bearing(&self) -> f64 {
        match self {
            Sector::N => 0.0,
            Sector::NE => 45.0,
            Sector::E => 90.0,
            Sector::SE => 135.0,
            Sector::S => 180.0,
            Sector::SW => 225.0,
            Sector::W => 270.0,
            Sector::NW => 315.0,
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Total haversine distance of a path starting at `origin` and visiting
/// `points` in order, in kilometers. One-way; no return leg.
pub fn path_distance_km(origin: &GeoPoint, points: &[GeoPoint]) -> f64 {
    let mut total = 0.0;
    let mut current = origin;
    for point in points {
        total += haversine_distance_km(current, point);
        current = point;
    }
    total
}

/// Absolute angular difference between two bearings, in degrees [0, 180].
pub fn bearing_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
