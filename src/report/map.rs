use askama::Template;
use askama_web::WebTemplate;
use serde::Serialize;

use super::view::{coordinates, escape_html};
use super::ReportData;

const SAN_FRANCISCO: [f64; 2] = [37.7749, -122.4194];

pub fn category_color(category: &str) -> &'static str {
    match category {
        "auto" => "green",
        "checkpoint" => "red",
        "landmark" => "orange",
        _ => "blue",
    }
}

pub fn speed_color(speed: f64) -> &'static str {
    if speed > 5.0 {
        "red"
    } else if speed > 2.0 {
        "orange"
    } else {
        "green"
    }
}

#[derive(Debug, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    /// HTML fragment, already escaped.
    pub popup: String,
}

#[derive(Debug, Serialize)]
pub struct RouteSegment {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MapLayers {
    pub center: [f64; 2],
    pub markers: Vec<MapMarker>,
    pub segments: Vec<RouteSegment>,
}

impl MapLayers {
    /// Markers for every waypoint and a polyline segment between consecutive located
    /// captures, colored by the speed at the segment start.
    pub fn build(data: &ReportData, default_center: Option<[f64; 2]>) -> Self {
        let located: Vec<_> = data
            .telemetry
            .iter()
            .filter_map(|md| md.location.map(|loc| (loc, md.speed().unwrap_or(0.0))))
            .collect();

        let center = data
            .waypoints
            .first()
            .map(|wp| [wp.location.latitude, wp.location.longitude])
            .or_else(|| located.first().map(|(loc, _)| [loc.latitude, loc.longitude]))
            .or(default_center)
            .unwrap_or(SAN_FRANCISCO);

        let markers = data
            .waypoints
            .iter()
            .map(|wp| MapMarker {
                lat: wp.location.latitude,
                lon: wp.location.longitude,
                color: category_color(&wp.category),
                popup: format!(
                    "<b>{}</b><br>Category: {}<br>Coordinates: {}<br>Time: {}",
                    escape_html(&wp.name),
                    escape_html(&wp.category),
                    coordinates(wp.location.latitude, wp.location.longitude),
                    escape_html(wp.display_time())
                ),
            })
            .collect();

        let segments = located
            .windows(2)
            .map(|pair| {
                let (from, speed) = pair[0];
                let (to, _) = pair[1];
                RouteSegment {
                    from: [from.latitude, from.longitude],
                    to: [to.latitude, to.longitude],
                    color: speed_color(speed),
                }
            })
            .collect();

        MapLayers {
            center,
            markers,
            segments,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub title: String,
    /// Layer data as a JS literal, safe to embed in a `<script>` block.
    pub layers_json: String,
}

impl MapTemplate {
    pub fn new(title: String, layers: &MapLayers) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(layers)?;
        Ok(MapTemplate {
            title,
            layers_json: json.replace("</", "<\\/"),
        })
    }
}
