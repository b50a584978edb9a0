//! REST API server for chemical structure diagram detection
//!
//! Exposes the detection facade over HTTP:
//! - `GET /health`: liveness plus model readiness
//! - `POST /detect`: run detection on an uploaded image
//! - `POST /visualize`: render and publish an annotated copy of an upload
//! - `GET /visualize/{filename}`: serve a previously rendered annotation

mod handlers;
mod types;
mod upload;

use axum::{
    routing::{get, post},
    Router,
};
use moldetect_detector::DetectionService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::*;
pub use types::*;

/// API server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    /// Detection facade running inference and rendering
    pub service: Arc<DetectionService>,
}

impl ApiState {
    /// Create new API state around a detection service
    #[must_use]
    pub fn new(service: DetectionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Detection API
        .route("/detect", post(detect))
        // Visualization API
        .route("/visualize", post(visualize))
        .route("/visualize/{filename}", get(get_visualization))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(addr: &str, state: ApiState) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await
}
