//! Mission reports: interactive map, HTML and PDF documents, and data exports.

mod export;
mod html;
mod map;
mod pdf;
mod pdf_writer;
mod view;

use askama::Template;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub use export::{to_csv, ExportFormat, ExportStatistics, MissionExport, ALL_MISSIONS};
pub use html::{ReportLinks, ReportTemplate};
pub use map::{MapLayers, MapTemplate};

use crate::analytics::{analyze, RouteAnalysis};
use crate::records::{MissionFilter, TelemetryRecord, WaypointRecord, DEFAULT_MISSION_ID};
use crate::storage::{RecordStore, Storage, StorageError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Report options taken from the `report` config section.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub pdf: bool,
    pub default_center: Option<[f64; 2]>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            pdf: true,
            default_center: None,
        }
    }
}

/// One filtered snapshot of the collections with its analysis.
pub struct ReportData {
    /// Mission label shown in reports and exports.
    pub mission_id: String,
    pub telemetry: Vec<TelemetryRecord>,
    pub waypoints: Vec<WaypointRecord>,
    pub analysis: RouteAnalysis,
}

impl ReportData {
    pub fn load(storage: &Storage, filter: &MissionFilter, all_label: &str) -> Result<Self, ReportError> {
        let telemetry = storage.telemetry.list(filter)?;
        let waypoints = storage.waypoints.list(filter)?;
        Ok(ReportData {
            mission_id: filter.mission_id().unwrap_or(all_label).to_string(),
            analysis: analyze(&telemetry, &waypoints),
            telemetry,
            waypoints,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportOutcome {
    pub status: &'static str,
    pub report_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_warning: Option<String>,
}

pub fn report_title(stamp: &str) -> String {
    format!("Mission Report - {}", stamp)
}

/// Writes `map_{ts}.html`, `report_{ts}.html` and, when enabled, `report_{ts}.pdf`.
///
/// A PDF failure does not fail the report; it is returned as `pdf_error`.
pub fn generate(
    storage: &Storage,
    settings: &ReportSettings,
    filter: &MissionFilter,
    now: DateTime<Utc>,
) -> Result<ReportOutcome, ReportError> {
    let data = ReportData::load(storage, filter, DEFAULT_MISSION_ID)?;
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let title = report_title(&stamp);

    let map_file = format!("map_{}.html", stamp);
    let layers = MapLayers::build(&data, settings.default_center);
    let map = MapTemplate::new(format!("Mission Map - {}", stamp), &layers)?.render()?;
    storage.save_report(&map_file, map.as_bytes())?;

    let html = ReportTemplate::new(&data, &title, now, ReportLinks::stored(&map_file)).render()?;
    let html_path = storage.save_report(&format!("report_{}.html", stamp), html.as_bytes())?;
    info!(
        "Generated report {} for mission {} ({} photos, {} waypoints)",
        html_path.display(),
        data.mission_id,
        data.telemetry.len(),
        data.waypoints.len()
    );

    let mut outcome = ReportOutcome {
        status: "ok",
        report_html: html_path.display().to_string(),
        report_pdf: None,
        pdf_error: None,
        pdf_warning: None,
    };

    if settings.pdf {
        let bytes = pdf::render(&data, &title, now, &storage.images_dir());
        match storage.save_report(&format!("report_{}.pdf", stamp), &bytes) {
            Ok(path) => outcome.report_pdf = Some(path.display().to_string()),
            Err(e) => {
                warn!("Failed to write PDF report: {}", e);
                outcome.pdf_error = Some(e.to_string());
            }
        }
    } else {
        outcome.pdf_warning = Some("PDF generation disabled in configuration".to_string());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Location, RoverStatus, WaypointLocation};
    use chrono::TimeZone;
    use std::path::Path;

    fn seeded_storage(dir: &Path) -> Storage {
        let storage = Storage::new(dir.to_path_buf());
        storage.ensure_layout().unwrap();
        for (mission, lat) in [("m1", 0.0), ("m1", 0.01), ("m2", 5.0)] {
            storage
                .telemetry
                .append(TelemetryRecord {
                    file: format!("{}_{}.jpg", mission, lat),
                    location: Some(Location {
                        latitude: lat,
                        longitude: 0.0,
                        ..Default::default()
                    }),
                    rover_status: Some(RoverStatus {
                        mission_id: Some(mission.into()),
                        battery_level: Some(90.0),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .unwrap();
        }
        storage
            .waypoints
            .append(WaypointRecord {
                name: "Base".into(),
                location: WaypointLocation::default(),
                category: "checkpoint".into(),
                description: String::new(),
                mission_id: Some("m1".into()),
                rover_id: None,
                auto_generated: false,
                timestamp: None,
                timestamp_readable: None,
                waypoint_id: "wp_001".into(),
            })
            .unwrap();
        storage
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let storage = seeded_storage(dir.path());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let outcome = generate(
            &storage,
            &ReportSettings::default(),
            &MissionFilter::Mission("m1".into()),
            now,
        )
        .unwrap();

        assert_eq!(outcome.status, "ok");
        assert!(outcome.report_html.ends_with("report_20240301_100000.html"));
        assert!(outcome.report_pdf.unwrap().ends_with("report_20240301_100000.pdf"));
        assert!(outcome.pdf_error.is_none());
        assert!(storage.reports_dir().join("map_20240301_100000.html").is_file());

        let html =
            std::fs::read_to_string(storage.reports_dir().join("report_20240301_100000.html")).unwrap();
        assert!(html.contains("<strong>Mission ID:</strong> m1"));
        assert!(html.contains("m1_0.01.jpg"));
        assert!(!html.contains("m2_5.jpg"));
    }

    #[test]
    fn test_generate_without_pdf_warns() {
        let dir = tempfile::tempdir().unwrap();
        let storage = seeded_storage(dir.path());
        let settings = ReportSettings {
            pdf: false,
            default_center: None,
        };

        let outcome = generate(&storage, &settings, &MissionFilter::All, Utc::now()).unwrap();
        assert!(outcome.report_pdf.is_none());
        assert!(outcome.pdf_warning.is_some());

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("report_pdf").is_none());
        assert!(json.get("pdf_error").is_none());
    }

    #[test]
    fn test_load_labels_unfiltered_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = seeded_storage(dir.path());

        let all = ReportData::load(&storage, &MissionFilter::All, ALL_MISSIONS).unwrap();
        assert_eq!(all.mission_id, "all_missions");
        assert_eq!(all.analysis.photo_count, 3);

        let m2 = ReportData::load(&storage, &MissionFilter::Mission("m2".into()), ALL_MISSIONS).unwrap();
        assert_eq!(m2.mission_id, "m2");
        assert_eq!(m2.analysis.photo_count, 1);
        assert_eq!(m2.analysis.waypoint_count, 0);
    }
}
