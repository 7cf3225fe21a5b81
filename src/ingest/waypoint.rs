use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{parse_number, text_or, IngestError};
use crate::records::{
    WaypointLocation, WaypointRecord, DEFAULT_CATEGORY, DEFAULT_MISSION_ID, DEFAULT_ROVER_ID,
};
use crate::storage::RecordStore;

pub const AUTO_CATEGORY: &str = "auto";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WaypointForm {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub altitude: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub mission_id: Option<String>,
    pub rover_id: Option<String>,
    /// `"true"` (any case) marks the waypoint as generated.
    pub auto_generated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AutoWaypointForm {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub altitude: Option<String>,
    pub mission_id: Option<String>,
    pub rover_id: Option<String>,
}

fn location(
    latitude: Option<&str>,
    longitude: Option<&str>,
    altitude: Option<&str>,
) -> Result<WaypointLocation, IngestError> {
    Ok(WaypointLocation {
        latitude: parse_number("latitude", latitude, 0.0)?,
        longitude: parse_number("longitude", longitude, 0.0)?,
        altitude: parse_number("altitude", altitude, 0.0)?,
    })
}

fn stamps(now: DateTime<Utc>) -> (Option<String>, Option<String>) {
    (
        Some(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        Some(now.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    )
}

/// Appends a named waypoint. Its id is its 1-based position in the whole collection.
pub fn add_waypoint<S>(
    store: &S,
    form: WaypointForm,
    now: DateTime<Utc>,
) -> Result<WaypointRecord, IngestError>
where
    S: RecordStore<WaypointRecord>,
{
    let name = form
        .name
        .filter(|n| !n.is_empty())
        .ok_or(IngestError::MissingName)?;
    let location = location(
        form.latitude.as_deref(),
        form.longitude.as_deref(),
        form.altitude.as_deref(),
    )?;
    let auto_generated = form
        .auto_generated
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let (timestamp, timestamp_readable) = stamps(now);

    let record = store.append_with(|existing| WaypointRecord {
        name,
        location,
        category: text_or(form.category, DEFAULT_CATEGORY),
        description: form.description.unwrap_or_default(),
        mission_id: Some(text_or(form.mission_id, DEFAULT_MISSION_ID)),
        rover_id: Some(text_or(form.rover_id, DEFAULT_ROVER_ID)),
        auto_generated,
        timestamp,
        timestamp_readable,
        waypoint_id: WaypointRecord::format_id(existing.len()),
    })?;

    info!("Added waypoint {} ({})", record.waypoint_id, record.name);
    Ok(record)
}

/// Appends a waypoint named after how many waypoints its mission already has.
pub fn add_auto_waypoint<S>(
    store: &S,
    form: AutoWaypointForm,
    now: DateTime<Utc>,
) -> Result<WaypointRecord, IngestError>
where
    S: RecordStore<WaypointRecord>,
{
    let location = location(
        form.latitude.as_deref(),
        form.longitude.as_deref(),
        form.altitude.as_deref(),
    )
    .map_err(|e| match e {
        IngestError::InvalidNumber(_) => IngestError::InvalidCoordinates,
        other => other,
    })?;
    let mission_id = text_or(form.mission_id, DEFAULT_MISSION_ID);
    let (timestamp, timestamp_readable) = stamps(now);

    let record = store.append_with(|existing| {
        let in_mission = existing
            .iter()
            .filter(|wp| wp.mission_id.as_deref() == Some(mission_id.as_str()))
            .count();
        WaypointRecord {
            name: format!("Auto Waypoint {}", in_mission + 1),
            location,
            category: AUTO_CATEGORY.to_string(),
            description: format!("Automatically generated waypoint during {}", mission_id),
            mission_id: Some(mission_id.clone()),
            rover_id: Some(text_or(form.rover_id, DEFAULT_ROVER_ID)),
            auto_generated: true,
            timestamp,
            timestamp_readable,
            waypoint_id: WaypointRecord::format_id(existing.len()),
        }
    })?;

    info!("Added waypoint {} ({})", record.waypoint_id, record.name);
    Ok(record)
}
