//! Structure model capability and the replay implementation

use std::collections::HashMap;
use std::path::Path;

use moldetect_common::{DetectError, DetectionResult, Result};
use tracing::{debug, info};

/// Manifest key matched when no entry exists for a file name
const FALLBACK_KEY: &str = "*";

/// Common interface for chemical structure detectors
///
/// Implementations are shared across concurrent requests behind an `Arc`,
/// so `predict` takes `&self`; a non-reentrant backend must serialize
/// internally.
pub trait StructureModel: Send + Sync {
    /// Run detection on the image at `image_path`
    ///
    /// When `coref` is false the result carries no co-reference groups.
    ///
    /// # Errors
    /// Implementation-specific inference failures.
    fn predict(&self, image_path: &Path, coref: bool) -> Result<DetectionResult>;

    /// Device the model runs on (for health reporting)
    fn device(&self) -> &str;
}

/// Detector that replays saved predictions from a JSON manifest
///
/// The manifest maps image file names to detection results, with an
/// optional `"*"` entry used for unlisted names. Names with no entry at
/// all yield an empty result. Every entry is validated when the manifest
/// loads, so replayed results are structurally sound.
#[derive(Debug)]
pub struct ReplayModel {
    manifest: HashMap<String, DetectionResult>,
}

impl ReplayModel {
    /// Load a predictions manifest from `path`
    ///
    /// # Errors
    /// IO failures reading the file, `MalformedResult` when the JSON does
    /// not parse or an entry fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading predictions manifest from {:?}", path);
        let raw = std::fs::read_to_string(path)?;
        let manifest: HashMap<String, DetectionResult> = serde_json::from_str(&raw)
            .map_err(|err| DetectError::MalformedResult(err.to_string()))?;
        for (name, result) in &manifest {
            result.validate().map_err(|err| {
                DetectError::MalformedResult(format!("manifest entry {name:?}: {err}"))
            })?;
        }
        info!("Loaded {} prediction entries", manifest.len());
        Ok(Self { manifest })
    }
}

impl StructureModel for ReplayModel {
    fn predict(&self, image_path: &Path, coref: bool) -> Result<DetectionResult> {
        let key = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let mut result = self
            .manifest
            .get(key)
            .or_else(|| self.manifest.get(FALLBACK_KEY))
            .cloned()
            .unwrap_or_default();
        if !coref {
            result.corefs.clear();
        }
        debug!(key, boxes = result.bboxes.len(), "replayed predictions");
        Ok(result)
    }

    fn device(&self) -> &str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manifest_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const ONE_BOX: &str = r#"{
        "bboxes": [
            {"category": "[Mol]", "category_id": 1,
             "bbox": [0.1, 0.1, 0.3, 0.3], "score": 0.95}
        ],
        "corefs": [[0, 0]]
    }"#;

    #[test]
    fn test_replay_serves_entry_by_file_name() {
        let file = manifest_file(&format!(r#"{{"page1.png": {ONE_BOX}}}"#));
        let model = ReplayModel::from_file(file.path()).unwrap();

        let result = model.predict(Path::new("/uploads/abc/page1.png"), true).unwrap();
        assert_eq!(result.bboxes.len(), 1);
        assert_eq!(result.bboxes[0].category, "[Mol]");
        assert_eq!(result.corefs, vec![vec![0, 0]]);
    }

    #[test]
    fn test_replay_falls_back_to_wildcard_then_empty() {
        let file = manifest_file(&format!(r#"{{"*": {ONE_BOX}}}"#));
        let model = ReplayModel::from_file(file.path()).unwrap();
        let result = model.predict(Path::new("unlisted.png"), true).unwrap();
        assert_eq!(result.bboxes.len(), 1);

        let file = manifest_file(r#"{"other.png": {"bboxes": [], "corefs": []}}"#);
        let model = ReplayModel::from_file(file.path()).unwrap();
        let result = model.predict(Path::new("unlisted.png"), true).unwrap();
        assert!(result.bboxes.is_empty());
        assert!(result.corefs.is_empty());
    }

    #[test]
    fn test_coref_flag_strips_groups() {
        let file = manifest_file(&format!(r#"{{"page1.png": {ONE_BOX}}}"#));
        let model = ReplayModel::from_file(file.path()).unwrap();
        let result = model.predict(Path::new("page1.png"), false).unwrap();
        assert_eq!(result.bboxes.len(), 1);
        assert!(result.corefs.is_empty());
    }

    #[test]
    fn test_unparseable_manifest_is_malformed() {
        let file = manifest_file("not json at all");
        let err = ReplayModel::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DetectError::MalformedResult(_)));
    }

    #[test]
    fn test_invalid_entry_is_rejected_at_load() {
        let file = manifest_file(
            r#"{"bad.png": {"bboxes": [], "corefs": [[3]]}}"#,
        );
        let err = ReplayModel::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DetectError::MalformedResult(_)));
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let err = ReplayModel::from_file(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, DetectError::Io(_)));
    }

    #[test]
    fn test_device_is_cpu() {
        let file = manifest_file("{}");
        let model = ReplayModel::from_file(file.path()).unwrap();
        assert_eq!(model.device(), "cpu");
    }
}
