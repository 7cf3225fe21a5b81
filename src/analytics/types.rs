use serde::Serialize;
use utoipa::ToSchema;

/// Distance, speed and time totals for a route.
///
/// `min_speed` is `f64::INFINITY` when the route has fewer than two records, and `0.0`
/// when it has records but none with a positive speed. Infinity serializes as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct RouteStats {
    /// Meters.
    pub total_distance: f64,
    pub total_distance_km: f64,
    /// Meters per second, distance over elapsed time.
    pub average_speed: f64,
    /// Seconds.
    pub total_time: f64,
    pub max_speed: f64,
    pub min_speed: f64,
}

impl RouteStats {
    pub(super) fn stationary() -> Self {
        RouteStats {
            total_distance: 0.0,
            total_distance_km: 0.0,
            average_speed: 0.0,
            total_time: 0.0,
            max_speed: 0.0,
            min_speed: f64::INFINITY,
        }
    }
}

/// Battery levels over a route. Either every field is present or none is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct BatteryAnalysis {
    /// Highest level seen, not the first chronologically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_battery: Option<f64>,
    /// Lowest level seen, not the last chronologically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_consumed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_battery: Option<f64>,
}

impl BatteryAnalysis {
    pub fn is_empty(&self) -> bool {
        self.initial_battery.is_none()
    }
}

/// Temperature and humidity summaries. Each dimension is present only when sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct EnvironmentalAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_humidity: Option<f64>,
}

/// Everything derived from one telemetry/waypoint snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RouteAnalysis {
    pub route_stats: RouteStats,
    pub battery_analysis: BatteryAnalysis,
    pub environmental_analysis: EnvironmentalAnalysis,
    pub waypoint_count: usize,
    pub photo_count: usize,
}
