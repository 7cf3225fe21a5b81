use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::{ReportData, ReportError};
use crate::analytics::RouteAnalysis;
use crate::records::{TelemetryRecord, WaypointRecord};

pub const ALL_MISSIONS: &str = "all_missions";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Anything other than `csv` exports JSON.
    pub fn from_query(format: Option<&str>) -> Self {
        format.and_then(|f| f.parse().ok()).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportStatistics {
    pub total_photos: usize,
    pub total_waypoints: usize,
    pub route_analysis: RouteAnalysis,
}

/// Full dump of one mission (or all missions) with its statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct MissionExport {
    pub mission_id: String,
    pub export_timestamp: String,
    pub metadata: Vec<TelemetryRecord>,
    pub waypoints: Vec<WaypointRecord>,
    pub statistics: ExportStatistics,
}

impl MissionExport {
    pub fn new(data: ReportData, now: DateTime<Utc>) -> Self {
        MissionExport {
            mission_id: data.mission_id,
            export_timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            statistics: ExportStatistics {
                total_photos: data.telemetry.len(),
                total_waypoints: data.waypoints.len(),
                route_analysis: data.analysis,
            },
            metadata: data.telemetry,
            waypoints: data.waypoints,
        }
    }
}

/// `type,latitude,longitude,timestamp,note` rows, waypoints first, then photos.
pub fn to_csv(telemetry: &[TelemetryRecord], waypoints: &[WaypointRecord]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["type", "latitude", "longitude", "timestamp", "note"])?;

    for wp in waypoints {
        writer.write_record([
            "waypoint".to_string(),
            format!("{:?}", wp.location.latitude),
            format!("{:?}", wp.location.longitude),
            wp.timestamp.clone().unwrap_or_default(),
            wp.description.clone(),
        ])?;
    }

    for md in telemetry {
        let (latitude, longitude) = md
            .location
            .map(|loc| (format!("{:?}", loc.latitude), format!("{:?}", loc.longitude)))
            .unwrap_or_default();
        writer.write_record([
            "photo".to_string(),
            latitude,
            longitude,
            md.timestamp.clone().unwrap_or_default(),
            md.note.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::analyze;
    use crate::records::{Location, WaypointLocation};
    use chrono::TimeZone;

    fn waypoint() -> WaypointRecord {
        WaypointRecord {
            name: "Ridge".into(),
            location: WaypointLocation {
                latitude: 37.7749,
                longitude: -122.4194,
                altitude: 0.0,
            },
            category: "landmark".into(),
            description: "north face, loose rock".into(),
            mission_id: Some("m1".into()),
            rover_id: None,
            auto_generated: false,
            timestamp: Some("2024-01-01T12:00:00+00:00".into()),
            timestamp_readable: None,
            waypoint_id: "wp_001".into(),
        }
    }

    fn capture() -> TelemetryRecord {
        TelemetryRecord {
            file: "a.jpg".into(),
            timestamp: Some("20240101_120500".into()),
            location: Some(Location {
                latitude: 1.0,
                longitude: 0.0,
                ..Default::default()
            }),
            note: Some("dust".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_from_query() {
        assert_eq!(ExportFormat::from_query(None), ExportFormat::Json);
        assert_eq!(ExportFormat::from_query(Some("csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("xml")), ExportFormat::Json);
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_csv_rows() {
        let csv = to_csv(&[capture()], &[waypoint()]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "type,latitude,longitude,timestamp,note",
                "waypoint,37.7749,-122.4194,2024-01-01T12:00:00+00:00,\"north face, loose rock\"",
                "photo,1.0,0.0,20240101_120500,dust",
            ]
        );
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(
            to_csv(&[], &[]).unwrap(),
            "type,latitude,longitude,timestamp,note\n"
        );
    }

    #[test]
    fn test_json_export_shape() {
        let telemetry = vec![capture()];
        let waypoints = vec![waypoint()];
        let data = ReportData {
            mission_id: ALL_MISSIONS.into(),
            analysis: analyze(&telemetry, &waypoints),
            telemetry,
            waypoints,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let json = serde_json::to_value(MissionExport::new(data, now)).unwrap();
        assert_eq!(json["mission_id"], "all_missions");
        assert_eq!(json["export_timestamp"], "2024-01-02T03:04:05.000000Z");
        assert_eq!(json["statistics"]["total_photos"], 1);
        assert_eq!(json["statistics"]["total_waypoints"], 1);
        assert_eq!(json["statistics"]["route_analysis"]["waypoint_count"], 1);
        assert_eq!(json["metadata"][0]["file"], "a.jpg");
        assert_eq!(json["waypoints"][0]["waypoint_id"], "wp_001");
    }
}
