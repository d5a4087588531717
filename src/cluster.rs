//! Directional clustering of stops into capacity-bounded candidate routes.
//!
//! Stops are bucketed into eight bearing sectors around the origin, sorted
//! by distance within each sector, and greedily packed into clusters that
//! never exceed the vehicle capacity. Radial, sector-confined clusters keep
//! routes directionally coherent and avoid loops.

use log::debug;

use crate::geo_utils::{bearing_degrees, haversine_distance_km, Sector};
use crate::{GeoPoint, Stop};

/// A capacity-bounded group of stops within one bearing sector.
///
/// Clusters are candidate routes: the caller assigns bus ids and depots.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Bearing sector all member stops fall into
    pub sector: Sector,
    /// Member stops, ordered closest-to-farthest from the origin
    pub stops: Vec<Stop>,
    /// Sum of student counts over `stops`
    pub total_students: u32,
    /// Mean distance of member stops from the origin, in km
    pub avg_distance_km: f64,
}

impl Cluster {
    fn from_stops(sector: Sector, members: Vec<AnnotatedStop>) -> Self {
        let total_students = members.iter().map(|m| m.stop.students).sum();
        let avg_distance_km =
            members.iter().map(|m| m.distance_km).sum::<f64>() / members.len() as f64;
        Self {
            sector,
            stops: members.into_iter().map(|m| m.stop).collect(),
            total_students,
            avg_distance_km,
        }
    }

    /// Centroid of the member stops.
    pub fn centroid(&self) -> GeoPoint {
        let n = self.stops.len() as f64;
        let lat = self.stops.iter().map(|s| s.point.latitude).sum::<f64>() / n;
        let lng = self.stops.iter().map(|s| s.point.longitude).sum::<f64>() / n;
        GeoPoint::new(lat, lng)
    }
}

struct AnnotatedStop {
    stop: Stop,
    distance_km: f64,
}

/// Cluster `stops` into capacity-bounded groups by bearing sector.
///
/// Algorithm:
/// 1. Compute bearing, distance and sector for every stop relative to
///    `origin`.
/// 2. Group stops by sector (sectors processed in fixed N→NW order).
/// 3. Within each sector, sort ascending by distance (stable: distance ties
///    keep input order).
/// 4. Greedily accumulate stops into the current cluster while the next
///    stop still fits under `capacity`; on overflow, close the cluster and
///    start a new one with that stop.
///
/// A cluster never spans two sectors and is never empty. Every input stop
/// lands in exactly one cluster. Output order is deterministic for a given
/// input order.
pub fn cluster_by_sector(stops: &[Stop], origin: &GeoPoint, capacity: u32) -> Vec<Cluster> {
    let mut by_sector: [Vec<AnnotatedStop>; 8] = Default::default();

    for stop in stops {
        let bearing = bearing_degrees(origin, &stop.point);
        let distance_km = haversine_distance_km(origin, &stop.point);
        let sector = Sector::from_bearing(bearing);
        by_sector[sector as usize].push(AnnotatedStop {
            stop: stop.clone(),
            distance_km,
        });
    }

    let mut clusters = Vec::new();

    for sector in Sector::ALL {
        let mut members = std::mem::take(&mut by_sector[sector as usize]);
        if members.is_empty() {
            continue;
        }

        // Stable sort: distance ties break by input order
        members.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        debug!("{} sector: {} stops", sector, members.len());

        let mut current: Vec<AnnotatedStop> = Vec::new();
        let mut current_load: u32 = 0;

        for member in members {
            let students = member.stop.students;
            if !current.is_empty() && current_load + students > capacity {
                clusters.push(Cluster::from_stops(sector, std::mem::take(&mut current)));
                current_load = 0;
            }
            current_load += students;
            current.push(member);
        }

        if !current.is_empty() {
            clusters.push(Cluster::from_stops(sector, current));
        }
    }

    for (index, cluster) in clusters.iter().enumerate() {
        debug!(
            "cluster {} ({}): {} stops, {} students, avg {:.1}km out",
            index + 1,
            cluster.sector,
            cluster.stops.len(),
            cluster.total_students,
            cluster.avg_distance_km
        );
    }

    clusters
}

/// Mean bearing of a cluster's stops as seen from the origin, in degrees
/// [0, 360).
///
/// Circular mean (averaged unit vectors), so clusters straddling north
/// (e.g. 350° and 10°) average to 0°, not 180°.
pub fn cluster_bearing(cluster: &Cluster, origin: &GeoPoint) -> f64 {
    let (sin_sum, cos_sum) = cluster
        .stops
        .iter()
        .map(|s| bearing_degrees(origin, &s.point).to_radians())
        .fold((0.0, 0.0), |(s, c), b| (s + b.sin(), c + b.cos()));
    (sin_sum.atan2(cos_sum).to_degrees() + 360.0) % 360.0
}
