use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_CATEGORY: &str = "general";

/// A named point of interest as persisted in `waypoints.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WaypointRecord {
    pub name: String,
    #[serde(default)]
    pub location: WaypointLocation,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rover_id: Option<String>,
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_readable: Option<String>,
    #[serde(default)]
    pub waypoint_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WaypointLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl WaypointRecord {
    /// Sequential identifier for the waypoint at 0-based `index` in the whole collection.
    pub fn format_id(index: usize) -> String {
        format!("wp_{:03}", index + 1)
    }

    /// Display time, preferring the human readable stamp.
    pub fn display_time(&self) -> &str {
        self.timestamp_readable
            .as_deref()
            .or(self.timestamp.as_deref())
            .unwrap_or("Unknown")
    }
}
