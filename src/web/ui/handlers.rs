use axum::extract::{Query, State};
use chrono::Utc;

use crate::records::{MissionFilter, DEFAULT_MISSION_ID};
use crate::report::{
    report_title, MapLayers, MapTemplate, ReportData, ReportError, ReportLinks, ReportTemplate,
};
use crate::web::api::camera::MissionQuery;
use crate::web::api::error::ApiResult;
use crate::web::state::AppState;

/// The mission report rendered on request instead of from a stored file.
pub async fn mission_report(
    State(state): State<AppState>,
    Query(query): Query<MissionQuery>,
) -> ApiResult<ReportTemplate> {
    let filter = MissionFilter::from_report_query(query.mission_id.as_deref());
    let data = ReportData::load(&state.storage, &filter, DEFAULT_MISSION_ID)?;
    let now = Utc::now();
    let title = report_title(&now.format("%Y%m%d_%H%M%S").to_string());

    Ok(ReportTemplate::new(
        &data,
        &title,
        now,
        ReportLinks::live(filter.mission_id()),
    ))
}

pub async fn mission_map(
    State(state): State<AppState>,
    Query(query): Query<MissionQuery>,
) -> ApiResult<MapTemplate> {
    let filter = MissionFilter::from_report_query(query.mission_id.as_deref());
    let data = ReportData::load(&state.storage, &filter, DEFAULT_MISSION_ID)?;
    let layers = MapLayers::build(&data, state.report.default_center);

    let map = MapTemplate::new(format!("Mission Map - {}", data.mission_id), &layers)
        .map_err(ReportError::from)?;
    Ok(map)
}
