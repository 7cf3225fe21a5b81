use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    analytics::RouteAnalysis,
    records::{MissionFilter, DEFAULT_MISSION_ID},
    report::{
        self, to_csv, ExportFormat, MissionExport, ReportData, ReportOutcome, ALL_MISSIONS,
    },
    storage::ReportEntry,
    web::api::error::{ApiError, ApiResult, ErrorResponse},
    web::state::AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateReportForm {
    /// `default` or absent reports on every mission.
    #[serde(default)]
    pub mission_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/report/generate_report",
    tag = "report",
    request_body(content = GenerateReportForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Report written", body = ReportOutcome),
        (status = 500, description = "Report could not be written", body = ErrorResponse)
    )
)]
pub async fn generate_report(
    State(state): State<AppState>,
    form: Result<Form<GenerateReportForm>, FormRejection>,
) -> ApiResult<Json<ReportOutcome>> {
    // A bare POST without a form body reports on every mission.
    let form = match form {
        Ok(Form(form)) => form,
        Err(FormRejection::InvalidFormContentType(_)) => GenerateReportForm::default(),
        Err(e) => return Err(ApiError::Validation(e.body_text())),
    };

    let filter = MissionFilter::from_report_query(form.mission_id.as_deref());
    // PDF layout reads every photo from disk.
    let outcome = tokio::task::spawn_blocking(move || {
        report::generate(&state.storage, &state.report, &filter, Utc::now())
    })
    .await??;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub mission_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/report/export_data",
    tag = "report",
    params(
        ("mission_id" = Option<String>, Query, description = "Only this mission; all when omitted"),
        ("format" = Option<String>, Query, description = "`csv` for CSV, anything else for JSON")
    ),
    responses(
        (status = 200, description = "Mission data as JSON or CSV", content(
            (MissionExport = "application/json"),
            (String = "text/csv")
        ))
    )
)]
pub async fn export_data(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let filter = MissionFilter::from_query(query.mission_id.as_deref());
    let data = ReportData::load(&state.storage, &filter, ALL_MISSIONS)?;

    match ExportFormat::from_query(query.format.as_deref()) {
        ExportFormat::Csv => {
            let csv = to_csv(&data.telemetry, &data.waypoints)?;
            Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response())
        }
        ExportFormat::Json => Ok(Json(MissionExport::new(data, Utc::now())).into_response()),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub status: &'static str,
    pub reports: Vec<ReportEntry>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/report/reports",
    tag = "report",
    responses(
        (status = 200, description = "Generated HTML reports, newest first", body = ReportListResponse)
    )
)]
pub async fn list_reports(State(state): State<AppState>) -> ApiResult<Json<ReportListResponse>> {
    let reports = state.storage.list_reports()?;
    Ok(Json(ReportListResponse {
        status: "ok",
        count: reports.len(),
        reports,
    }))
}

#[utoipa::path(
    get,
    path = "/api/report/download/{filename}",
    tag = "report",
    params(
        ("filename" = String, Path, description = "`report_*.html` or `report_*.pdf`")
    ),
    responses(
        (status = 200, description = "Report file as attachment"),
        (status = 400, description = "Filename is not a report", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn download_report(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.storage.report_path(&filename)?;
    let bytes = std::fs::read(&path).map_err(crate::storage::StorageError::from)?;

    let content_type = if filename.ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/html; charset=utf-8"
    };
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteAnalysisResponse {
    pub status: &'static str,
    pub mission_id: String,
    pub analysis: RouteAnalysis,
}

#[utoipa::path(
    get,
    path = "/api/report/route_analysis",
    tag = "report",
    params(
        ("mission_id" = Option<String>, Query, description = "`default` or absent analyzes every mission")
    ),
    responses(
        (status = 200, description = "Route analysis", body = RouteAnalysisResponse)
    )
)]
pub async fn route_analysis(
    State(state): State<AppState>,
    Query(query): Query<super::camera::MissionQuery>,
) -> ApiResult<Json<RouteAnalysisResponse>> {
    let filter = MissionFilter::from_report_query(query.mission_id.as_deref());
    let data = ReportData::load(&state.storage, &filter, DEFAULT_MISSION_ID)?;
    Ok(Json(RouteAnalysisResponse {
        status: "ok",
        mission_id: data.mission_id,
        analysis: data.analysis,
    }))
}
