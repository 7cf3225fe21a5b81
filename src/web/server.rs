use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::camera as camera_handlers;
use super::api::report as report_handlers;
use super::api::root as root_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.web.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/", get(root_handlers::index))
        // UI routes
        .route("/ui/report", get(ui_handlers::mission_report))
        .route("/ui/map", get(ui_handlers::mission_map))
        // Camera API endpoints
        .route("/api/camera/capture", post(camera_handlers::capture))
        .route("/api/camera/waypoint", post(camera_handlers::add_waypoint))
        .route(
            "/api/camera/waypoint/auto",
            post(camera_handlers::add_auto_waypoint),
        )
        .route("/api/camera/waypoints", get(camera_handlers::list_waypoints))
        .route("/api/camera/metadata", get(camera_handlers::list_metadata))
        // Report API endpoints
        .route(
            "/api/report/generate_report",
            post(report_handlers::generate_report),
        )
        .route("/api/report/export_data", get(report_handlers::export_data))
        .route("/api/report/reports", get(report_handlers::list_reports))
        .route(
            "/api/report/download/{filename}",
            get(report_handlers::download_report),
        )
        .route(
            "/api/report/route_analysis",
            get(report_handlers::route_analysis),
        )
        // Stored photos and generated reports
        .nest_service("/storage/images", ServeDir::new(state.storage.images_dir()))
        .nest_service("/storage/reports", ServeDir::new(state.storage.reports_dir()))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::new(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    if let Err(e) = state.storage.ensure_layout() {
        log::warn!("Failed to create storage folders: {}", e);
    }
    log::info!("Storing rover data in {}", state.storage.base().display());

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
