//! Tests for cluster module

use std::collections::HashSet;

use busplan::cluster::cluster_bearing;
use busplan::geo_utils::{bearing_difference, Sector};
use busplan::{cluster_by_sector, GeoPoint, Stop};

/// ~1 km of latitude in degrees.
const KM_LAT: f64 = 1.0 / 111.195;

fn stop_north(id: &str, km: f64, students: u32) -> Stop {
    Stop::new(id, GeoPoint::new(13.0 + km * KM_LAT, 80.0), students)
}

#[test]
fn test_capacity_packing_in_one_sector() {
    // Three stops due north at 1, 2, 3 km with 20 students each and a
    // 55-seat bus: the first two fit together, the third starts a new
    // cluster.
    let origin = GeoPoint::new(13.0, 80.0);
    let stops = vec![
        stop_north("s1", 1.0, 20),
        stop_north("s2", 2.0, 20),
        stop_north("s3", 3.0, 20),
    ];

    let clusters = cluster_by_sector(&stops, &origin, 55);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].total_students, 40);
    assert_eq!(clusters[0].stops.len(), 2);
    assert_eq!(clusters[0].stops[0].id, "s1");
    assert_eq!(clusters[0].stops[1].id, "s2");
    assert_eq!(clusters[1].total_students, 20);
    assert_eq!(clusters[1].stops[0].id, "s3");
}

#[test]
fn test_sorted_closest_to_farthest() {
    let origin = GeoPoint::new(13.0, 80.0);
    // Input deliberately out of distance order
    let stops = vec![
        stop_north("far", 9.0, 5),
        stop_north("near", 1.0, 5),
        stop_north("mid", 4.0, 5),
    ];

    let clusters = cluster_by_sector(&stops, &origin, 55);

    assert_eq!(clusters.len(), 1);
    let ids: Vec<&str> = clusters[0].stops.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid", "far"]);
}

#[test]
fn test_every_stop_in_exactly_one_cluster() {
    let origin = GeoPoint::new(13.0, 80.0);
    let mut stops = Vec::new();
    // Scatter stops across all directions
    for i in 0..24 {
        let angle = (i as f64 * 15.0).to_radians();
        let lat = 13.0 + 0.1 * angle.cos();
        let lng = 80.0 + 0.1 * angle.sin();
        stops.push(Stop::new(&format!("s{i}"), GeoPoint::new(lat, lng), 10));
    }

    let clusters = cluster_by_sector(&stops, &origin, 30);

    let mut seen = HashSet::new();
    for cluster in &clusters {
        assert!(!cluster.stops.is_empty(), "empty cluster emitted");
        for stop in &cluster.stops {
            assert!(seen.insert(stop.id.clone()), "stop {} duplicated", stop.id);
        }
    }
    assert_eq!(seen.len(), stops.len());
}

#[test]
fn test_clusters_never_span_sectors() {
    let origin = GeoPoint::new(13.0, 80.0);
    let north = stop_north("n", 2.0, 5);
    let east = Stop::new("e", GeoPoint::new(13.0, 80.0 + 2.0 * KM_LAT), 5);

    // Both would fit in one bus, but they sit in different sectors
    let clusters = cluster_by_sector(&[north, east], &origin, 55);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].sector, Sector::N);
    assert_eq!(clusters[1].sector, Sector::E);
}

#[test]
fn test_sector_order_is_deterministic() {
    let origin = GeoPoint::new(13.0, 80.0);
    let south = Stop::new("s", GeoPoint::new(12.98, 80.0), 5);
    let north = stop_north("n", 2.0, 5);

    // North sector always comes out before south regardless of input order
    let clusters_a = cluster_by_sector(&[south.clone(), north.clone()], &origin, 55);
    let clusters_b = cluster_by_sector(&[north, south], &origin, 55);

    assert_eq!(clusters_a[0].sector, Sector::N);
    assert_eq!(clusters_b[0].sector, Sector::N);
    assert_eq!(clusters_a[1].sector, Sector::S);
    assert_eq!(clusters_b[1].sector, Sector::S);
}

#[test]
fn test_distance_ties_keep_input_order() {
    let origin = GeoPoint::new(13.0, 80.0);
    // Two stops at the same point: stable sort must keep input order
    let stops = vec![
        stop_north("first", 2.0, 5),
        stop_north("second", 2.0, 5),
    ];

    let clusters = cluster_by_sector(&stops, &origin, 55);
    let ids: Vec<&str> = clusters[0].stops.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn test_single_stop_over_capacity_gets_own_cluster() {
    let origin = GeoPoint::new(13.0, 80.0);
    let stops = vec![stop_north("small", 1.0, 10), stop_north("big", 2.0, 80)];

    let clusters = cluster_by_sector(&stops, &origin, 55);

    // The oversized stop cannot be combined but is never lost
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].stops[0].id, "small");
    assert_eq!(clusters[1].stops[0].id, "big");
    assert_eq!(clusters[1].total_students, 80);
}

#[test]
fn test_repeated_runs_identical() {
    let origin = GeoPoint::new(13.0, 80.0);
    let stops: Vec<Stop> = (0..30)
        .map(|i| {
            let angle = (i as f64 * 37.0).to_radians();
            Stop::new(
                &format!("s{i}"),
                GeoPoint::new(13.0 + 0.15 * angle.cos(), 80.0 + 0.15 * angle.sin()),
                7,
            )
        })
        .collect();

    let a = cluster_by_sector(&stops, &origin, 55);
    let b = cluster_by_sector(&stops, &origin, 55);

    assert_eq!(a.len(), b.len());
    for (ca, cb) in a.iter().zip(&b) {
        assert_eq!(ca.sector, cb.sector);
        let ids_a: Vec<&str> = ca.stops.iter().map(|s| s.id.as_str()).collect();
        let ids_b: Vec<&str> = cb.stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
    }
}

#[test]
fn test_empty_input_yields_no_clusters() {
    let origin = GeoPoint::new(13.0, 80.0);
    assert!(cluster_by_sector(&[], &origin, 55).is_empty());
}

#[test]
fn test_cluster_bearing_straddling_north() {
    let origin = GeoPoint::new(13.0, 80.0);
    // Two stops just either side of due north (~350° and ~10°); both land
    // in the N sector, so they form one cluster. An arithmetic mean of the
    // bearings would come out near 180°; the cluster direction must be
    // near 0°.
    let stops = vec![
        Stop::new(
            "west-of-north",
            GeoPoint::new(13.0 + 0.1 * 0.985, 80.0 - 0.1 * 0.174),
            5,
        ),
        Stop::new(
            "east-of-north",
            GeoPoint::new(13.0 + 0.1 * 0.985, 80.0 + 0.1 * 0.174),
            5,
        ),
    ];

    let clusters = cluster_by_sector(&stops, &origin, 55);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].sector, Sector::N);

    let bearing = cluster_bearing(&clusters[0], &origin);
    assert!(
        bearing_difference(bearing, 0.0) < 5.0,
        "cluster bearing {bearing} not near north"
    );
}

#[test]
fn test_cluster_bearing_plain_mean_case() {
    let origin = GeoPoint::new(13.0, 80.0);
    // Stops around due east; no wraparound involved
    let stops = vec![
        Stop::new("e1", GeoPoint::new(13.001, 80.0 + 2.0 * KM_LAT), 5),
        Stop::new("e2", GeoPoint::new(12.999, 80.0 + 2.0 * KM_LAT), 5),
    ];

    let clusters = cluster_by_sector(&stops, &origin, 55);
    assert_eq!(clusters.len(), 1);

    let bearing = cluster_bearing(&clusters[0], &origin);
    assert!(bearing_difference(bearing, 90.0) < 5.0);
}
