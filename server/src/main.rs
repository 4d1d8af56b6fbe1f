mod config;
mod handlers;
mod routes;
mod state;

use analysis_service_cli::config::ServiceConfig;
use analysis_service_cli::tracker::JobTracker;
use analysis_service_cli::transport::HttpAnalysisService;
use analysis_service_cli::upload::MAX_UPLOAD_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use config::DashboardConfig;
use routes::jobs::job_routes;
use state::AppState;

// room for the multipart framing around a maximum-size file
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dashboard = DashboardConfig::from_env()?;
    let service = HttpAnalysisService::new(&ServiceConfig::from_env()?)?;
    log::info!("analysis service at {}", service.base_url());
    let state = AppState::new(Arc::new(JobTracker::new(Arc::new(service))));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    let cors = match dashboard.client_origin.clone() {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    };

    let app = Router::new()
        .nest("/api", job_routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(Extension(state))
        .layer(cors);

    let listener = TcpListener::bind(dashboard.addr).await?;
    log::info!("dashboard listening on {}", dashboard.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
