use super::{TelemetryRecord, WaypointRecord, DEFAULT_MISSION_ID};

/// Selects the records belonging to a mission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissionFilter {
    #[default]
    All,
    Mission(String),
}

impl MissionFilter {
    /// Any non-empty mission id narrows the selection.
    pub fn from_query(mission_id: Option<&str>) -> Self {
        match mission_id {
            Some(id) if !id.is_empty() => MissionFilter::Mission(id.to_string()),
            _ => MissionFilter::All,
        }
    }

    /// Only an absent id or the `default` mission selects everything; an empty id
    /// is a mission of its own and matches nothing stored.
    pub fn from_report_query(mission_id: Option<&str>) -> Self {
        match mission_id {
            None | Some(DEFAULT_MISSION_ID) => MissionFilter::All,
            Some(id) => MissionFilter::Mission(id.to_string()),
        }
    }

    pub fn mission_id(&self) -> Option<&str> {
        match self {
            MissionFilter::All => None,
            MissionFilter::Mission(id) => Some(id.as_str()),
        }
    }

    pub fn matches_telemetry(&self, record: &TelemetryRecord) -> bool {
        match self {
            MissionFilter::All => true,
            MissionFilter::Mission(id) => record.mission_id() == Some(id.as_str()),
        }
    }

    pub fn matches_waypoint(&self, record: &WaypointRecord) -> bool {
        match self {
            MissionFilter::All => true,
            MissionFilter::Mission(id) => record.mission_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Records that can be selected by mission.
pub trait MissionScoped {
    fn in_mission(&self, filter: &MissionFilter) -> bool;
}

impl MissionScoped for TelemetryRecord {
    fn in_mission(&self, filter: &MissionFilter) -> bool {
        filter.matches_telemetry(self)
    }
}

impl MissionScoped for WaypointRecord {
    fn in_mission(&self, filter: &MissionFilter) -> bool {
        filter.matches_waypoint(self)
    }
}
