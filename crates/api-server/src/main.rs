//! API server binary entry point

use anyhow::{Context as _, Result};
use moldetect_api_server::{start_server, ApiState};
use moldetect_detector::{DetectionService, ServiceConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moldetect_api_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get bind address and service paths from environment or use defaults
    let addr =
        std::env::var("MOLDETECT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:13007".to_string());

    let mut config = ServiceConfig::default();
    if let Ok(path) = std::env::var("MOLDETECT_MODEL_PATH") {
        config.model_path = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("MOLDETECT_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("MOLDETECT_FONT_PATH") {
        config.font_path = Some(PathBuf::from(path));
    }

    // Create API state
    let service =
        DetectionService::new(config).context("Failed to initialize detection service")?;
    let state = ApiState::new(service);

    // Start server
    tracing::info!("Starting MolDetect API Server");
    start_server(&addr, state)
        .await
        .context("API server exited with an error")?;

    Ok(())
}
