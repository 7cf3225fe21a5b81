use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Endpoints {
    pub camera_capture: &'static str,
    pub add_waypoint: &'static str,
    pub auto_waypoint: &'static str,
    pub waypoints: &'static str,
    pub metadata: &'static str,
    pub generate_report: &'static str,
    pub export_data: &'static str,
    pub reports: &'static str,
    pub route_analysis: &'static str,
    pub mission_view: &'static str,
    pub api_docs: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceIndex {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service banner and endpoint map", body = ServiceIndex)
    )
)]
pub async fn index() -> Json<ServiceIndex> {
    Json(ServiceIndex {
        message: "Rover API is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            camera_capture: "/api/camera/capture",
            add_waypoint: "/api/camera/waypoint",
            auto_waypoint: "/api/camera/waypoint/auto",
            waypoints: "/api/camera/waypoints",
            metadata: "/api/camera/metadata",
            generate_report: "/api/report/generate_report",
            export_data: "/api/report/export_data",
            reports: "/api/report/reports",
            route_analysis: "/api/report/route_analysis",
            mission_view: "/ui/report",
            api_docs: "/swagger-ui",
        },
    })
}
