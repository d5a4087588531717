//! Tests for filter module

use busplan::geo_utils::haversine_distance_km;
use busplan::{filter_by_radius, GeoPoint, Stop};

fn stop_at(id: &str, lat: f64, lng: f64) -> Stop {
    Stop::new(id, GeoPoint::new(lat, lng), 10)
}

#[test]
fn test_keeps_stops_within_radius() {
    let origin = GeoPoint::new(13.0, 80.0);
    // ~11 km north vs ~55 km north
    let near = stop_at("near", 13.1, 80.0);
    let far = stop_at("far", 13.5, 80.0);

    let outcome = filter_by_radius(&[near.clone(), far.clone()], &origin, 40.0);

    assert_eq!(outcome.kept.len(), 1);
    assert_eq!(outcome.kept[0].id, "near");
    assert_eq!(outcome.excluded.len(), 1);
    assert_eq!(outcome.excluded[0].id, "far");
}

#[test]
fn test_boundary_is_inclusive() {
    let origin = GeoPoint::new(13.0, 80.0);
    let stop = stop_at("edge", 13.2, 80.0);
    let distance = haversine_distance_km(&origin, &stop.point);

    let outcome = filter_by_radius(&[stop], &origin, distance);
    assert_eq!(outcome.kept.len(), 1);
    assert!(outcome.excluded.is_empty());
}

#[test]
fn test_partition_is_exact() {
    // Every stop is kept iff its distance is within the radius
    let origin = GeoPoint::new(13.0, 80.0);
    let stops: Vec<Stop> = (0..20)
        .map(|i| stop_at(&format!("s{i}"), 13.0 + i as f64 * 0.05, 80.0))
        .collect();

    let radius = 40.0;
    let outcome = filter_by_radius(&stops, &origin, radius);

    assert_eq!(outcome.kept.len() + outcome.excluded.len(), stops.len());
    for stop in &outcome.kept {
        assert!(haversine_distance_km(&origin, &stop.point) <= radius);
    }
    for stop in &outcome.excluded {
        assert!(haversine_distance_km(&origin, &stop.point) > radius);
    }
}

#[test]
fn test_preserves_input_order() {
    let origin = GeoPoint::new(13.0, 80.0);
    let stops = vec![
        stop_at("a", 13.05, 80.0),
        stop_at("b", 13.9, 80.0), // excluded
        stop_at("c", 13.10, 80.0),
        stop_at("d", 13.8, 80.0), // excluded
        stop_at("e", 13.01, 80.0),
    ];

    let outcome = filter_by_radius(&stops, &origin, 40.0);

    let kept_ids: Vec<&str> = outcome.kept.iter().map(|s| s.id.as_str()).collect();
    let excluded_ids: Vec<&str> = outcome.excluded.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(kept_ids, vec!["a", "c", "e"]);
    assert_eq!(excluded_ids, vec!["b", "d"]);
}

#[test]
fn test_empty_input() {
    let origin = GeoPoint::new(13.0, 80.0);
    let outcome = filter_by_radius(&[], &origin, 40.0);
    assert!(outcome.kept.is_empty());
    assert!(outcome.excluded.is_empty());
}
