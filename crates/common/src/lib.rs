/// Common types and utilities for chemical structure detection
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detection and rendering errors
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Malformed detection result: {0}")]
    MalformedResult(String),

    #[error("No usable annotation font found")]
    FontUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for DetectError {
    fn from(err: image::ImageError) -> Self {
        DetectError::Decode(err.to_string())
    }
}

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, DetectError>;

/// Bounding box in normalized image coordinates (0-1)
///
/// On the wire this is the model's four-element array `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    /// X coordinate of top-left corner (normalized 0-1)
    pub x1: f64,
    /// Y coordinate of top-left corner (normalized 0-1)
    pub y1: f64,
    /// X coordinate of bottom-right corner (normalized 0-1)
    pub x2: f64,
    /// Y coordinate of bottom-right corner (normalized 0-1)
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Get width of bounding box
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Get height of bounding box
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Check that corners are ordered (`x1 <= x2`, `y1 <= y2`)
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self {
            x1: v[0],
            y1: v[1],
            x2: v[2],
            y2: v[3],
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One detected structural element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Category label (e.g. `[Mol]`, `[Idt]`, `[Rct]`)
    pub category: String,
    /// Numeric category identifier
    pub category_id: i64,
    /// Bounding box with normalized coordinates
    pub bbox: BoundingBox,
    /// Confidence score (0-1)
    pub score: f64,
}

/// Indices of detections that refer to the same underlying entity
pub type CorefGroup = Vec<usize>;

/// Complete output of one inference call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detections in display order (a detection's position is its display index)
    pub bboxes: Vec<Detection>,
    /// Co-reference groups addressing `bboxes` by index
    #[serde(default)]
    pub corefs: Vec<CorefGroup>,
}

impl DetectionResult {
    /// Check the structural invariants rendering relies on.
    ///
    /// Coordinates outside 0-1 pass: the renderer clips them at the drawing
    /// surface. Inverted corners and out-of-range co-reference indices do not.
    ///
    /// # Errors
    /// Returns `MalformedResult` naming the offending detection or group.
    pub fn validate(&self) -> Result<()> {
        for (i, det) in self.bboxes.iter().enumerate() {
            if !det.bbox.is_ordered() {
                return Err(DetectError::MalformedResult(format!(
                    "detection {} has inverted bbox corners ({}, {}, {}, {})",
                    i, det.bbox.x1, det.bbox.y1, det.bbox.x2, det.bbox.y2
                )));
            }
        }
        for (g, group) in self.corefs.iter().enumerate() {
            for &idx in group {
                if idx >= self.bboxes.len() {
                    return Err(DetectError::MalformedResult(format!(
                        "coref group {} references detection {} but only {} exist",
                        g,
                        idx,
                        self.bboxes.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON-encoded result (the model's output schema)
    ///
    /// # Errors
    /// Returns `MalformedResult` if the JSON does not match the schema or
    /// violates the structural invariants.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let result: Self =
            serde_json::from_str(s).map_err(|e| DetectError::MalformedResult(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    /// Check if any detection carries the given category label
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.bboxes.iter().any(|d| d.category == category)
    }
}
