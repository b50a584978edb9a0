//! Detection service facade
//!
//! Owns the model lifecycle and composes inference with annotation
//! rendering. The service is constructed once at startup and shared by
//! reference across requests; all methods take `&self`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use moldetect_annotate::{save_png_atomic, Annotator};
use moldetect_common::{DetectError, DetectionResult, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::{ReplayModel, StructureModel};

/// Service configuration, read from the environment by the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Predictions manifest consumed by the replay model
    pub model_path: PathBuf,
    /// Directory annotated artifacts are written to
    pub output_dir: PathBuf,
    /// Explicit font file; system fonts are probed when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/predictions.json"),
            output_dir: PathBuf::from("assets/output"),
            font_path: None,
        }
    }
}

/// Model lifecycle
///
/// The only transition is `Unloaded` to `Ready`, made once during service
/// construction. A process that starts without a model stays degraded
/// until restart.
pub enum ModelState {
    /// No model available; detection calls fail fast
    Unloaded,
    /// Model loaded and shared across requests
    Ready(Arc<dyn StructureModel>),
}

/// Facade over model inference and annotation rendering
pub struct DetectionService {
    state: ModelState,
    annotator: Annotator,
    output_dir: PathBuf,
}

impl DetectionService {
    /// Build the service from configuration
    ///
    /// The annotation font and output directory are required; a model that
    /// fails to load is logged and leaves the service in degraded mode
    /// rather than failing startup.
    ///
    /// # Errors
    /// Font resolution failures and output directory creation failures.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let annotator = Annotator::new(config.font_path.as_deref())?;
        std::fs::create_dir_all(&config.output_dir)?;

        let state = match ReplayModel::from_file(&config.model_path) {
            Ok(model) => {
                info!("Detection model ready");
                ModelState::Ready(Arc::new(model))
            }
            Err(err) => {
                warn!("Model load failed, serving degraded: {err}");
                ModelState::Unloaded
            }
        };

        Ok(Self {
            state,
            annotator,
            output_dir: config.output_dir,
        })
    }

    /// Assemble a service from preconstructed parts
    ///
    /// Lets callers inject a custom model implementation; [`Self::new`] is
    /// the manifest-backed path. The output directory must already exist.
    pub fn from_parts(
        model: Option<Arc<dyn StructureModel>>,
        annotator: Annotator,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let state = match model {
            Some(model) => ModelState::Ready(model),
            None => ModelState::Unloaded,
        };
        Self {
            state,
            annotator,
            output_dir: output_dir.into(),
        }
    }

    /// Whether the model loaded and detection calls can succeed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Device of the loaded model, if any
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready(model) => Some(model.device()),
            ModelState::Unloaded => None,
        }
    }

    /// Directory rendered artifacts are written to
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn model(&self) -> Result<&Arc<dyn StructureModel>> {
        match &self.state {
            ModelState::Ready(model) => Ok(model),
            ModelState::Unloaded => Err(DetectError::ModelNotLoaded),
        }
    }

    /// Run detection on the image at `image_path`
    ///
    /// Pass-through to the model capability; the result is rendered-side
    /// validated only when it reaches the annotator.
    ///
    /// # Errors
    /// `ModelNotLoaded` while degraded, plus model inference failures.
    pub fn detect(&self, image_path: &Path) -> Result<DetectionResult> {
        let result = self.model()?.predict(image_path, true)?;
        info!(
            boxes = result.bboxes.len(),
            corefs = result.corefs.len(),
            "detection complete"
        );
        Ok(result)
    }

    /// Render the annotated visualization for an image
    ///
    /// When `result` is `None` the model runs first. Supplying a result
    /// skips inference but still requires a loaded model.
    ///
    /// # Errors
    /// `ModelNotLoaded` while degraded, `Decode` for unreadable images,
    /// `MalformedResult` for structurally invalid results.
    pub fn visualize(
        &self,
        image_path: &Path,
        display_name: &str,
        result: Option<DetectionResult>,
    ) -> Result<RgbaImage> {
        let model = self.model()?;
        let result = match result {
            Some(result) => result,
            None => model.predict(image_path, true)?,
        };
        let image = image::open(image_path)?;
        self.annotator.render(&image, &result, display_name)
    }

    /// Render a visualization and publish it under the output directory
    ///
    /// The artifact name is `visualization_{display_name}_{uuid}.png`, so
    /// concurrent requests for the same file never collide. Nothing is
    /// written when rendering fails.
    ///
    /// # Errors
    /// Same as [`Self::visualize`], plus IO failures writing the artifact.
    pub fn visualize_to_file(
        &self,
        image_path: &Path,
        display_name: &str,
        result: Option<DetectionResult>,
    ) -> Result<PathBuf> {
        let rendered = self.visualize(image_path, display_name, result)?;
        let output_path = self.output_dir.join(artifact_name(display_name));
        save_png_atomic(&rendered, &output_path)?;
        info!(path = %output_path.display(), "visualization written");
        Ok(output_path)
    }
}

/// Collision-resistant artifact file name for an upload
fn artifact_name(display_name: &str) -> String {
    let base = Path::new(display_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    format!("visualization_{}_{}.png", base, Uuid::new_v4())
}
