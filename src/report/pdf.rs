use chrono::{DateTime, Utc};
use log::debug;
use std::path::Path;

use super::pdf_writer::{Jpeg, PdfDocument};
use super::view::{number, number_or_na, PhotoSummary, WaypointSummary};
use super::ReportData;

const PHOTO_WIDTH: f64 = 432.0;
const PHOTO_HEIGHT: f64 = 324.0;

/// Lays out the printable report. Photos are read from `images_dir`; photos that are
/// missing are skipped and unreadable ones are noted inline.
pub fn render(data: &ReportData, title: &str, generated: DateTime<Utc>, images_dir: &Path) -> Vec<u8> {
    let stats = &data.analysis.route_stats;
    let battery = &data.analysis.battery_analysis;
    let env = &data.analysis.environmental_analysis;
    let header = ("Metric", "Value");

    let mut doc = PdfDocument::new();
    doc.title(title);

    doc.heading("Mission Statistics");
    doc.table(
        header,
        &[
            ("Total Distance".into(), format!("{:.3} km", stats.total_distance_km)),
            ("Average Speed".into(), format!("{} m/s", number(stats.average_speed))),
            ("Max Speed".into(), format!("{} m/s", number(stats.max_speed))),
            ("Total Waypoints".into(), data.analysis.waypoint_count.to_string()),
            ("Total Photos".into(), data.analysis.photo_count.to_string()),
        ],
    );

    doc.heading("Battery Analysis");
    doc.table(
        header,
        &[
            ("Initial Battery".into(), format!("{}%", number_or_na(battery.initial_battery))),
            ("Final Battery".into(), format!("{}%", number_or_na(battery.final_battery))),
            ("Battery Consumed".into(), format!("{}%", number_or_na(battery.battery_consumed))),
            ("Average Battery".into(), format!("{}%", number_or_na(battery.average_battery))),
        ],
    );

    doc.heading("Environmental Conditions");
    doc.table(
        header,
        &[
            (
                "Average Temperature".into(),
                format!("{}\u{b0}C", number_or_na(env.avg_temperature)),
            ),
            (
                "Temperature Range".into(),
                format!(
                    "{}\u{b0}C - {}\u{b0}C",
                    number_or_na(env.min_temperature),
                    number_or_na(env.max_temperature)
                ),
            ),
            ("Average Humidity".into(), format!("{}%", number_or_na(env.avg_humidity))),
            (
                "Humidity Range".into(),
                format!(
                    "{}% - {}%",
                    number_or_na(env.min_humidity),
                    number_or_na(env.max_humidity)
                ),
            ),
        ],
    );

    doc.heading("Waypoints");
    for wp in data.waypoints.iter().map(WaypointSummary::from) {
        doc.bold_line(&format!("{} ({})", wp.name, wp.category_label));
        doc.paragraph(&format!("Coordinates: {}", wp.coordinates));
        doc.paragraph(&format!("Altitude: {}", wp.altitude));
        doc.paragraph(&format!("Time: {}", wp.time));
        if !wp.description.is_empty() {
            doc.paragraph(&format!("Description: {}", wp.description));
        }
        doc.spacer(10.0);
    }

    doc.page_break();
    doc.heading("Mission Photos");
    for (i, md) in data.telemetry.iter().enumerate() {
        let photo = PhotoSummary::from(md);
        doc.heading(&format!("Photo {}: {}", i + 1, photo.timestamp));

        let path = images_dir.join(&photo.file);
        if !photo.file.is_empty() && path.is_file() {
            match std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| Jpeg::parse(bytes).map_err(|e| e.to_string()))
            {
                Ok(jpeg) => {
                    doc.image(jpeg, PHOTO_WIDTH, PHOTO_HEIGHT);
                    doc.spacer(10.0);
                }
                Err(e) => {
                    debug!("Not embedding {}: {}", path.display(), e);
                    doc.paragraph(&format!("Image not available: {}", e));
                }
            }
        }

        doc.table(("Property", "Value"), &photo.rows());
        doc.spacer(20.0);
    }

    doc.heading("Mission Summary");
    doc.table(
        header,
        &[
            ("Mission ID".into(), data.mission_id.clone()),
            ("Total Waypoints".into(), data.waypoints.len().to_string()),
            ("Total Photos".into(), data.telemetry.len().to_string()),
            (
                "Report Generated".into(),
                generated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ),
        ],
    );

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::analyze;
    use crate::records::TelemetryRecord;
    use chrono::TimeZone;

    #[test]
    fn test_render_notes_unreadable_photos() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"\x89PNG").unwrap();

        let telemetry = vec![
            TelemetryRecord {
                file: "a.png".into(),
                ..Default::default()
            },
            TelemetryRecord {
                file: "missing.jpg".into(),
                ..Default::default()
            },
        ];
        let data = ReportData {
            mission_id: "default".into(),
            analysis: analyze(&telemetry, &[]),
            telemetry,
            waypoints: vec![],
        };
        let generated = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let bytes = render(&data, "Mission Report - x", generated, dir.path());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert_eq!(text.matches("Image not available").count(), 1);
        assert!(text.contains("(Photo 2: Unknown Time) Tj"));
        assert!(!text.contains("/DCTDecode"));
    }
}
