//! HTTP request handlers for API endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{error, info, warn};

use crate::{
    types::{DetectResponse, HealthResponse, ImageInfo, VisualizeParams, VisualizeResponse},
    upload::spool_upload,
    ApiState,
};
use moldetect_common::{DetectError, DetectionResult};

/// Map a pipeline error to the HTTP status it surfaces as
fn error_status(err: &DetectError) -> StatusCode {
    match err {
        DetectError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        DetectError::Decode(_) => StatusCode::BAD_REQUEST,
        DetectError::MalformedResult(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DetectError::FontUnavailable | DetectError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A name that stays inside the output directory when joined to it
fn is_plain_file_name(name: &str) -> bool {
    let mut components = std::path::Path::new(name).components();
    matches!(components.next(), Some(std::path::Component::Normal(_)))
        && components.next().is_none()
}

/// Health check endpoint
pub async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let model_loaded = state.service.is_ready();
    let message = if model_loaded {
        "MolDetect API is running"
    } else {
        "MolDetect API is running without a loaded model"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        message: message.to_string(),
        model_loaded,
        device: state.service.device().unwrap_or("unknown").to_string(),
    })
}

/// Run structure detection on an uploaded image
///
/// Expects a multipart form with a `file` field holding the image. Returns
/// the predicted bounding boxes and co-reference groups together with basic
/// image metadata.
pub async fn detect(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = spool_upload(multipart).await?;
    info!("Detection request: filename={}", upload.filename);

    // Decoding and inference are CPU-bound; move them off the async workers
    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || {
        let (width, height) = image::image_dimensions(upload.path()).map_err(|e| {
            error!("Failed to read uploaded image {}: {}", upload.filename, e);
            (StatusCode::BAD_REQUEST, format!("Invalid image file: {e}"))
        })?;

        let predictions = service.detect(upload.path()).map_err(|err| {
            error!("Detection failed for {}: {}", upload.filename, err);
            (error_status(&err), format!("Detection failed: {err}"))
        })?;

        Ok::<_, (StatusCode, String)>(DetectResponse {
            success: true,
            message: "detection complete".to_string(),
            predictions,
            image_info: ImageInfo {
                width,
                height,
                filename: upload.filename,
                content_type: upload.content_type,
            },
        })
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task join error: {e}"),
        )
    })??;

    Ok(Json(response))
}

/// Render an annotated copy of an uploaded image
///
/// When the `predictions` query parameter carries a JSON-encoded result the
/// model is not invoked, but a loaded model is still required. The rendered
/// PNG is published under the output directory and its path returned.
pub async fn visualize(
    State(state): State<ApiState>,
    Query(params): Query<VisualizeParams>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let provided = match params.predictions.as_deref() {
        Some(raw) => Some(DetectionResult::from_json_str(raw).map_err(|err| {
            warn!("Rejected supplied predictions: {}", err);
            (error_status(&err), format!("Invalid predictions: {err}"))
        })?),
        None => None,
    };

    let upload = spool_upload(multipart).await?;
    info!(
        "Visualization request: filename={}, supplied_predictions={}",
        upload.filename,
        provided.is_some()
    );

    let service = state.service.clone();
    let output_path = tokio::task::spawn_blocking(move || {
        service
            .visualize_to_file(upload.path(), &upload.filename, provided)
            .map_err(|err| {
                error!("Visualization failed for {}: {}", upload.filename, err);
                (error_status(&err), format!("Visualization failed: {err}"))
            })
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task join error: {e}"),
        )
    })??;

    Ok(Json(VisualizeResponse {
        success: true,
        message: "visualization complete".to_string(),
        image_path: output_path.display().to_string(),
    }))
}

/// Serve a previously rendered visualization from the output directory
pub async fn get_visualization(
    State(state): State<ApiState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !is_plain_file_name(&filename) {
        warn!("Rejected visualization lookup for {:?}", filename);
        return Err((StatusCode::BAD_REQUEST, "Invalid filename".to_string()));
    }

    let path = state.service.output_dir().join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            (
                StatusCode::NOT_FOUND,
                format!("Visualization not found: {filename}"),
            )
        } else {
            error!("Failed to read visualization {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read visualization: {e}"),
            )
        }
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
