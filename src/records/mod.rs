mod filter;
mod telemetry;
mod waypoint;

pub use filter::{MissionFilter, MissionScoped};
pub use telemetry::{CameraInfo, Environment, Location, Motion, RoverStatus, TelemetryRecord};
pub use waypoint::{WaypointLocation, WaypointRecord, DEFAULT_CATEGORY};

pub const DEFAULT_MISSION_ID: &str = "default";
pub const DEFAULT_ROVER_ID: &str = "rover_001";
