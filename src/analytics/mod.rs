//! Route analytics: turns an ordered telemetry snapshot into mission statistics.
//!
//! The engine is pure. It never fails: missing optional fields are excluded from the
//! aggregates, and unusable capture times only drop that pair's time contribution.

mod conditions;
pub mod geodesic;
mod route;
mod timestamp;
mod types;

pub use conditions::{battery_analysis, environmental_analysis};
pub use geodesic::distance;
pub use route::route_stats;
pub use timestamp::{parse_capture_time, TimestampError};
pub use types::{BatteryAnalysis, EnvironmentalAnalysis, RouteAnalysis, RouteStats};

use crate::records::{TelemetryRecord, WaypointRecord};

/// Derives the full analysis for one telemetry/waypoint snapshot.
pub fn analyze(telemetry: &[TelemetryRecord], waypoints: &[WaypointRecord]) -> RouteAnalysis {
    RouteAnalysis {
        route_stats: route_stats(telemetry),
        battery_analysis: battery_analysis(telemetry),
        environmental_analysis: environmental_analysis(telemetry),
        waypoint_count: waypoints.len(),
        photo_count: telemetry.len(),
    }
}

/// Two decimals, halves to the even digit.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Environment, Location, RoverStatus, WaypointLocation};
    use serde_json::json;

    fn waypoint(name: &str) -> WaypointRecord {
        WaypointRecord {
            name: name.to_string(),
            location: WaypointLocation::default(),
            category: "general".to_string(),
            description: String::new(),
            mission_id: None,
            rover_id: None,
            auto_generated: false,
            timestamp: None,
            timestamp_readable: None,
            waypoint_id: String::new(),
        }
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyze(&[], &[]);
        assert_eq!(analysis.route_stats.min_speed, f64::INFINITY);
        assert!(analysis.battery_analysis.is_empty());
        assert_eq!(analysis.environmental_analysis, EnvironmentalAnalysis::default());
        assert_eq!(analysis.waypoint_count, 0);
        assert_eq!(analysis.photo_count, 0);
    }

    #[test]
    fn test_counts_follow_input_lengths() {
        let telemetry = vec![TelemetryRecord::default(); 3];
        let waypoints = vec![waypoint("a"), waypoint("b")];
        let analysis = analyze(&telemetry, &waypoints);
        assert_eq!(analysis.waypoint_count, 2);
        assert_eq!(analysis.photo_count, 3);
    }

    #[test]
    fn test_json_shape() {
        let telemetry = vec![
            TelemetryRecord {
                datetime_iso: Some("2024-01-01T00:00:00Z".into()),
                location: Some(Location {
                    latitude: 37.7749,
                    longitude: -122.4194,
                    ..Default::default()
                }),
                rover_status: Some(RoverStatus {
                    battery_level: Some(80.0),
                    ..Default::default()
                }),
                ..Default::default()
            },
            TelemetryRecord {
                datetime_iso: Some("2024-01-01T00:10:00Z".into()),
                location: Some(Location {
                    latitude: 37.7849,
                    longitude: -122.4094,
                    ..Default::default()
                }),
                environment: Some(Environment {
                    temperature: None,
                    humidity: Some(45.0),
                }),
                ..Default::default()
            },
        ];

        let value = serde_json::to_value(analyze(&telemetry, &[])).unwrap();
        let route = value["route_stats"].as_object().unwrap();
        for key in [
            "total_distance",
            "total_distance_km",
            "average_speed",
            "total_time",
            "max_speed",
            "min_speed",
        ] {
            assert!(route.contains_key(key), "missing {key}");
        }
        assert_eq!(value["route_stats"]["total_time"], 600.0);
        assert_eq!(value["route_stats"]["min_speed"], 0.0);
        assert_eq!(
            value["battery_analysis"],
            json!({
                "initial_battery": 80.0,
                "final_battery": 80.0,
                "battery_consumed": 0.0,
                "average_battery": 80.0
            })
        );
        assert_eq!(
            value["environmental_analysis"],
            json!({"avg_humidity": 45.0, "min_humidity": 45.0, "max_humidity": 45.0})
        );
        assert_eq!(value["photo_count"], 2);
    }

    #[test]
    fn test_degenerate_min_speed_serializes_as_null() {
        let value = serde_json::to_value(analyze(&[TelemetryRecord::default()], &[])).unwrap();
        assert!(value["route_stats"]["min_speed"].is_null());
        assert_eq!(value["route_stats"]["total_distance_km"], 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(2.346), 2.35);
        assert_eq!(round2(-0.126), -0.13);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        assert_eq!(round2(20.125), 20.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }
}
