use askama::Template;
use askama_web::WebTemplate;
use chrono::{DateTime, Utc};

use super::view::{encode_query_value, number, number_or_na, PhotoSummary, WaypointSummary};
use super::ReportData;

pub struct StatCard {
    pub value: String,
    pub label: &'static str,
}

impl StatCard {
    fn new(value: impl Into<String>, label: &'static str) -> Self {
        StatCard {
            value: value.into(),
            label,
        }
    }
}

pub struct PhotoEntry {
    pub summary: PhotoSummary,
    pub src: String,
}

/// Where the rendered page finds its map and photos. Stored reports use paths relative to
/// `reports/`, live pages use absolute URLs.
pub struct ReportLinks {
    pub map_src: String,
    pub image_base: String,
}

impl ReportLinks {
    pub fn stored(map_file: &str) -> Self {
        ReportLinks {
            map_src: map_file.to_string(),
            image_base: "../images".to_string(),
        }
    }

    /// Links for a page served by the web UI.
    pub fn live(mission_id: Option<&str>) -> Self {
        let map_src = match mission_id {
            Some(id) => format!("/ui/map?mission_id={}", encode_query_value(id)),
            None => "/ui/map".to_string(),
        };
        ReportLinks {
            map_src,
            image_base: "/storage/images".to_string(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub title: String,
    pub mission_cards: Vec<StatCard>,
    pub battery_cards: Vec<StatCard>,
    pub environment_cards: Vec<StatCard>,
    pub waypoints: Vec<WaypointSummary>,
    pub photos: Vec<PhotoEntry>,
    pub map_src: String,
    pub route_cards: Vec<StatCard>,
    pub mission_id: String,
    pub total_waypoints: usize,
    pub total_photos: usize,
    pub generated: String,
    pub data_points: usize,
}

impl ReportTemplate {
    pub fn new(data: &ReportData, title: &str, generated: DateTime<Utc>, links: ReportLinks) -> Self {
        let stats = &data.analysis.route_stats;
        let battery = &data.analysis.battery_analysis;
        let env = &data.analysis.environmental_analysis;

        ReportTemplate {
            title: title.to_string(),
            mission_cards: vec![
                StatCard::new(number(stats.total_distance_km), "Total Distance (km)"),
                StatCard::new(number(stats.average_speed), "Average Speed (m/s)"),
                StatCard::new(data.analysis.waypoint_count.to_string(), "Waypoints"),
                StatCard::new(data.analysis.photo_count.to_string(), "Photos Taken"),
            ],
            battery_cards: vec![
                StatCard::new(
                    format!("{}%", number_or_na(battery.initial_battery)),
                    "Initial Battery",
                ),
                StatCard::new(
                    format!("{}%", number_or_na(battery.final_battery)),
                    "Final Battery",
                ),
                StatCard::new(
                    format!("{}%", number_or_na(battery.battery_consumed)),
                    "Battery Consumed",
                ),
            ],
            environment_cards: vec![
                StatCard::new(
                    format!("{}\u{b0}C", number_or_na(env.avg_temperature)),
                    "Average Temperature",
                ),
                StatCard::new(
                    format!("{}%", number_or_na(env.avg_humidity)),
                    "Average Humidity",
                ),
            ],
            waypoints: data.waypoints.iter().map(WaypointSummary::from).collect(),
            photos: data
                .telemetry
                .iter()
                .map(|md| PhotoEntry {
                    src: format!("{}/{}", links.image_base, md.file),
                    summary: PhotoSummary::from(md),
                })
                .collect(),
            map_src: links.map_src,
            route_cards: vec![
                StatCard::new(number(stats.total_distance), "Total Distance (meters)"),
                StatCard::new(number(stats.max_speed), "Max Speed (m/s)"),
                StatCard::new(format!("{:.0}", stats.total_time), "Total Time (seconds)"),
            ],
            mission_id: data.mission_id.clone(),
            total_waypoints: data.waypoints.len(),
            total_photos: data.telemetry.len(),
            generated: generated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            data_points: data.waypoints.len() + data.telemetry.len(),
        }
    }
}
