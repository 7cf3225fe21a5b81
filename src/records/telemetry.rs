use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One capture event as persisted in `metadata.json`.
///
/// Every nested block and every optional leaf may be absent in stored data; absence is
/// preserved on re-serialization so that the analytics can tell "missing" from "zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TelemetryRecord {
    #[serde(default)]
    pub file: String,
    /// Compact capture stamp, `%Y%m%d_%H%M%S`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Capture instant as ISO-8601, UTC assumed when no offset is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rover_status: Option<RoverStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Motion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoverStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rover_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CameraInfo {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub file_size_bytes: u64,
}

impl TelemetryRecord {
    pub fn mission_id(&self) -> Option<&str> {
        self.rover_status.as_ref()?.mission_id.as_deref()
    }

    pub fn speed(&self) -> Option<f64> {
        self.motion.as_ref()?.speed
    }

    pub fn battery_level(&self) -> Option<f64> {
        self.rover_status.as_ref()?.battery_level
    }

    pub fn temperature(&self) -> Option<f64> {
        self.environment.as_ref()?.temperature
    }

    pub fn humidity(&self) -> Option<f64> {
        self.environment.as_ref()?.humidity
    }
}
