//! Chemical structure detection service
//!
//! Composes a detection model with the annotation renderer behind a single
//! facade. The model is a trait capability; the shipped implementation
//! replays saved predictions from a JSON manifest, keeping real inference
//! an external concern while preserving the service contract:
//!
//! - `detect` returns the model's predictions for an uploaded image
//! - `visualize` renders predictions onto the image and can publish the
//!   result as a uniquely named PNG artifact
//! - a service whose model failed to load keeps running degraded and
//!   reports itself not ready
//!
//! # Example
//! ```no_run
//! use moldetect_detector::{DetectionService, ServiceConfig};
//! use std::path::Path;
//!
//! # fn main() -> moldetect_common::Result<()> {
//! let service = DetectionService::new(ServiceConfig::default())?;
//!
//! let predictions = service.detect(Path::new("reaction.png"))?;
//! println!("found {} structures", predictions.bboxes.len());
//!
//! let artifact = service.visualize_to_file(Path::new("reaction.png"), "reaction.png", None)?;
//! println!("annotated image at {}", artifact.display());
//! # Ok(())
//! # }
//! ```

pub mod model;
pub mod service;

pub use model::{ReplayModel, StructureModel};
pub use service::{DetectionService, ModelState, ServiceConfig};
