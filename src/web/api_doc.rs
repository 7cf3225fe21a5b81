use utoipa::OpenApi;

use super::api::{camera, error::ErrorResponse, report, root};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::index,
        camera::capture,
        camera::add_waypoint,
        camera::add_auto_waypoint,
        camera::list_waypoints,
        camera::list_metadata,
        report::generate_report,
        report::export_data,
        report::list_reports,
        report::download_report,
        report::route_analysis,
    ),
    components(
        schemas(
            ErrorResponse,
            root::ServiceIndex,
            camera::WaypointResponse,
            camera::WaypointListResponse,
            camera::MetadataListResponse,
            report::GenerateReportForm,
            report::ReportListResponse,
            report::RouteAnalysisResponse,
            crate::ingest::CaptureForm,
            crate::ingest::CaptureOutcome,
            crate::ingest::WaypointForm,
            crate::ingest::AutoWaypointForm,
            crate::records::TelemetryRecord,
            crate::records::WaypointRecord,
            crate::report::ReportOutcome,
            crate::report::MissionExport,
            crate::storage::ReportEntry,
            crate::analytics::RouteAnalysis,
        )
    ),
    info(
        title = "Rover-O-Mat API",
        description = "Photo and telemetry capture, waypoints, route analytics and mission reports",
        version = "0.1.0"
    ),
    tags(
        (name = "service", description = "Service index"),
        (name = "camera", description = "Captures, waypoints and stored records"),
        (name = "report", description = "Route analysis, reports and exports")
    )
)]
pub struct ApiDoc;
