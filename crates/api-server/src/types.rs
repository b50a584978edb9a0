//! API request and response types

use moldetect_common::DetectionResult;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Human-readable status message
    pub message: String,
    /// Whether the detection model finished loading
    pub model_loaded: bool,
    /// Device the model reports running on
    pub device: String,
}

/// Basic properties of an uploaded image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Filename as supplied by the client
    pub filename: String,
    /// Declared content type of the upload
    pub content_type: String,
}

/// Detection response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    /// Whether detection succeeded
    pub success: bool,
    /// Status message
    pub message: String,
    /// Detected structures and co-reference groups
    pub predictions: DetectionResult,
    /// Properties of the analyzed image
    pub image_info: ImageInfo,
}

/// Visualization response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizeResponse {
    /// Whether rendering succeeded
    pub success: bool,
    /// Status message
    pub message: String,
    /// Server path of the rendered annotation
    pub image_path: String,
}

/// Query parameters for the visualization endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualizeParams {
    /// JSON-encoded `DetectionResult` to render instead of running the model
    #[serde(default)]
    pub predictions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            message: "MolDetect API is running".to_string(),
            model_loaded: true,
            device: "cpu".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"model_loaded\":true"));
        assert!(json.contains("\"device\":\"cpu\""));
    }

    #[test]
    fn test_detect_response_serialization() {
        let response = DetectResponse {
            success: true,
            message: "detection complete".to_string(),
            predictions: DetectionResult::default(),
            image_info: ImageInfo {
                width: 640,
                height: 480,
                filename: "reaction.png".to_string(),
                content_type: "image/png".to_string(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"bboxes\":[]"));
        assert!(json.contains("\"width\":640"));
    }

    #[test]
    fn test_visualize_response_serialization() {
        let response = VisualizeResponse {
            success: true,
            message: "visualization complete".to_string(),
            image_path: "assets/output/visualization_reaction.png_1234.png".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"image_path\""));
        assert!(json.contains("visualization_reaction.png"));
    }

    #[test]
    fn test_visualize_params_default() {
        let params = VisualizeParams::default();
        assert!(params.predictions.is_none());

        let params: VisualizeParams = serde_json::from_str("{}").unwrap();
        assert!(params.predictions.is_none());
    }

    #[test]
    fn test_visualize_params_with_predictions() {
        let params: VisualizeParams =
            serde_json::from_str(r#"{"predictions": "{\"bboxes\": []}"}"#).unwrap();
        assert_eq!(params.predictions.as_deref(), Some("{\"bboxes\": []}"));
    }
}
