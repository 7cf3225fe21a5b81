use axum::{
    extract::{Multipart, Query, State},
    Form, Json,
};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    ingest::{self, AutoWaypointForm, CaptureForm, CaptureOutcome, ImageUpload, WaypointForm},
    records::{MissionFilter, TelemetryRecord, WaypointRecord},
    storage::RecordStore,
    web::api::error::{ApiResult, ErrorResponse},
    web::state::AppState,
};

const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    post,
    path = "/api/camera/capture",
    tag = "camera",
    request_body(content = CaptureForm, content_type = "multipart/form-data",
        description = "Telemetry fields plus the photo in an `image` file part"),
    responses(
        (status = 200, description = "Photo stored and telemetry recorded", body = CaptureOutcome),
        (status = 400, description = "Missing image or invalid numeric field", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn capture(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<CaptureOutcome>> {
    let mut form = CaptureForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            image = Some(ImageUpload {
                filename,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            if !form.set(&name, value) {
                debug!("Ignoring unknown capture field '{}'", name);
            }
        }
    }

    let storage = state.storage.clone();
    let outcome =
        tokio::task::spawn_blocking(move || ingest::capture(&storage, form, image, Utc::now()))
            .await??;
    Ok(Json(outcome))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WaypointResponse {
    pub status: &'static str,
    pub waypoint: WaypointRecord,
}

#[utoipa::path(
    post,
    path = "/api/camera/waypoint",
    tag = "camera",
    request_body(content = WaypointForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Waypoint recorded", body = WaypointResponse),
        (status = 400, description = "Missing name or invalid numeric field", body = ErrorResponse)
    )
)]
pub async fn add_waypoint(
    State(state): State<AppState>,
    Form(form): Form<WaypointForm>,
) -> ApiResult<Json<WaypointResponse>> {
    let waypoint = ingest::add_waypoint(&state.storage.waypoints, form, Utc::now())?;
    Ok(Json(WaypointResponse {
        status: "ok",
        waypoint,
    }))
}

#[utoipa::path(
    post,
    path = "/api/camera/waypoint/auto",
    tag = "camera",
    request_body(content = AutoWaypointForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Auto waypoint recorded", body = WaypointResponse),
        (status = 400, description = "Invalid latitude or longitude", body = ErrorResponse)
    )
)]
pub async fn add_auto_waypoint(
    State(state): State<AppState>,
    Form(form): Form<AutoWaypointForm>,
) -> ApiResult<Json<WaypointResponse>> {
    let waypoint = ingest::add_auto_waypoint(&state.storage.waypoints, form, Utc::now())?;
    Ok(Json(WaypointResponse {
        status: "ok",
        waypoint,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MissionQuery {
    #[serde(default)]
    pub mission_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WaypointListResponse {
    pub status: &'static str,
    pub waypoints: Vec<WaypointRecord>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/camera/waypoints",
    tag = "camera",
    params(
        ("mission_id" = Option<String>, Query, description = "Only waypoints of this mission; all when omitted")
    ),
    responses(
        (status = 200, description = "Stored waypoints in insertion order", body = WaypointListResponse)
    )
)]
pub async fn list_waypoints(
    State(state): State<AppState>,
    Query(query): Query<MissionQuery>,
) -> ApiResult<Json<WaypointListResponse>> {
    let filter = MissionFilter::from_query(query.mission_id.as_deref());
    let waypoints = state.storage.waypoints.list(&filter)?;
    Ok(Json(WaypointListResponse {
        status: "ok",
        count: waypoints.len(),
        waypoints,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataListResponse {
    pub status: &'static str,
    pub metadata: Vec<TelemetryRecord>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/camera/metadata",
    tag = "camera",
    params(
        ("mission_id" = Option<String>, Query, description = "Only captures of this mission; all when omitted")
    ),
    responses(
        (status = 200, description = "Stored telemetry records in insertion order", body = MetadataListResponse)
    )
)]
pub async fn list_metadata(
    State(state): State<AppState>,
    Query(query): Query<MissionQuery>,
) -> ApiResult<Json<MetadataListResponse>> {
    let filter = MissionFilter::from_query(query.mission_id.as_deref());
    let metadata = state.storage.telemetry.list(&filter)?;
    Ok(Json(MetadataListResponse {
        status: "ok",
        count: metadata.len(),
        metadata,
    }))
}
