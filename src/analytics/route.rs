use log::debug;

use super::geodesic::distance;
use super::round2;
use super::timestamp::elapsed_seconds;
use super::types::RouteStats;
use crate::records::TelemetryRecord;

/// Accumulates distance, speed samples and elapsed time over consecutive record pairs.
pub fn route_stats(telemetry: &[TelemetryRecord]) -> RouteStats {
    if telemetry.len() < 2 {
        return RouteStats::stationary();
    }

    let mut total_distance = 0.0;
    let mut total_time = 0.0;
    let mut speeds = Vec::new();

    for (i, pair) in telemetry.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);

        if let (Some(a), Some(b)) = (prev.location, curr.location) {
            total_distance += distance(a.latitude, a.longitude, b.latitude, b.longitude);
        }

        if let Some(speed) = curr.speed().filter(|s| *s > 0.0) {
            speeds.push(speed);
        }

        match elapsed_seconds(prev, curr) {
            Ok(seconds) => total_time += seconds,
            Err(e) => debug!("No elapsed time for records {}-{}: {}", i, i + 1, e),
        }
    }

    let average_speed = if total_time > 0.0 {
        total_distance / total_time
    } else {
        0.0
    };

    let (max_speed, min_speed) = if speeds.is_empty() {
        (0.0, 0.0)
    } else {
        (
            speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            speeds.iter().copied().fold(f64::INFINITY, f64::min),
        )
    };

    RouteStats {
        total_distance: round2(total_distance),
        total_distance_km: if total_distance > 0.0 {
            round2(total_distance / 1000.0)
        } else {
            0.0
        },
        average_speed: round2(average_speed),
        total_time: round2(total_time),
        max_speed: round2(max_speed),
        min_speed: round2(min_speed),
    }
}
