//! Display strings shared by the HTML and PDF reports.

use crate::records::{TelemetryRecord, WaypointRecord};

/// Floats print the way JSON readers expect them: `85.0`, `1.39`.
pub(crate) fn number(v: f64) -> String {
    format!("{:?}", v)
}

pub(crate) fn number_or_na(v: Option<f64>) -> String {
    v.map(number).unwrap_or_else(|| "N/A".to_string())
}

pub(crate) fn coordinates(latitude: f64, longitude: f64) -> String {
    format!("({:.6}, {:.6})", latitude, longitude)
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes a query string value.
pub(crate) fn encode_query_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub struct WaypointSummary {
    pub name: String,
    pub category: String,
    pub category_label: String,
    pub coordinates: String,
    pub altitude: String,
    pub time: String,
    pub description: String,
}

impl From<&WaypointRecord> for WaypointSummary {
    fn from(wp: &WaypointRecord) -> Self {
        WaypointSummary {
            name: wp.name.clone(),
            category: wp.category.clone(),
            category_label: wp.category.to_uppercase(),
            coordinates: coordinates(wp.location.latitude, wp.location.longitude),
            altitude: format!("{:.1}m", wp.location.altitude),
            time: wp.display_time().to_string(),
            description: wp.description.clone(),
        }
    }
}

pub struct PhotoSummary {
    pub file: String,
    pub timestamp: String,
    pub coordinates: String,
    pub altitude: String,
    pub heading: String,
    pub speed: String,
    pub temperature: String,
    pub humidity: String,
    pub battery: String,
    pub battery_class: &'static str,
    pub note: String,
}

impl PhotoSummary {
    /// Label/value rows in display order.
    pub fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("Location".into(), self.coordinates.clone()),
            ("Altitude".into(), self.altitude.clone()),
            ("Heading".into(), self.heading.clone()),
            ("Speed".into(), self.speed.clone()),
            ("Temperature".into(), self.temperature.clone()),
            ("Humidity".into(), self.humidity.clone()),
            ("Battery".into(), self.battery.clone()),
            ("Note".into(), self.note.clone()),
        ]
    }
}

fn battery_class(level: f64) -> &'static str {
    if level > 50.0 {
        "battery-high"
    } else if level > 20.0 {
        "battery-medium"
    } else {
        "battery-low"
    }
}

impl From<&TelemetryRecord> for PhotoSummary {
    fn from(md: &TelemetryRecord) -> Self {
        let location = md.location.unwrap_or_default();
        let battery = md.battery_level().unwrap_or(100.0);
        PhotoSummary {
            file: md.file.clone(),
            timestamp: md
                .timestamp
                .clone()
                .unwrap_or_else(|| "Unknown Time".to_string()),
            coordinates: coordinates(location.latitude, location.longitude),
            altitude: format!("{:.1}m", location.altitude),
            heading: format!("{:.1}\u{b0}", location.heading),
            speed: format!("{:.2} m/s", md.speed().unwrap_or(0.0)),
            temperature: format!("{:.1}\u{b0}C", md.temperature().unwrap_or(0.0)),
            humidity: format!("{:.1}%", md.humidity().unwrap_or(0.0)),
            battery: format!("{:.1}%", battery),
            battery_class: battery_class(battery),
            note: md.note.clone().unwrap_or_else(|| "No notes".to_string()),
        }
    }
}
