//! Deterministic annotation rendering for chemical structure detections
//!
//! Turns a detection result (normalized bounding boxes with categories and
//! scores, plus optional co-reference groups) into an annotated raster
//! image.
//!
//! # Pipeline
//! - **Geometry**: normalized box to pixel box, `round(coord * dimension)`
//!   per axis, no clamping
//! - **Palette**: fixed category color table with a gray fallback
//! - **Linker**: dashed segments between the first and last member of each
//!   co-reference group, with a glyph at the midpoint
//! - **Renderer**: box outlines, labels, scores, index markers, then a
//!   title band and category legend on the final canvas
//!
//! Rendering the same input twice produces pixel-identical output.
//!
//! # Example
//! ```no_run
//! use moldetect_annotate::{save_png_atomic, Annotator};
//! use moldetect_common::DetectionResult;
//! use std::path::Path;
//!
//! # fn main() -> moldetect_common::Result<()> {
//! let annotator = Annotator::new(None)?;
//! let image = image::open("reaction.png")?;
//! let result = DetectionResult::default();
//!
//! let canvas = annotator.render(&image, &result, "reaction.png")?;
//! save_png_atomic(&canvas, Path::new("assets/output/annotated.png"))?;
//! # Ok(())
//! # }
//! ```

pub mod font;
pub mod geometry;
pub mod linker;
pub mod palette;
pub mod render;

pub use font::resolve_font;
pub use geometry::{to_pixel_box, PixelBox};
pub use linker::{dash_strokes, plan_links, LinkSegment};
pub use palette::{color_for, legend_entries, CATEGORY_COLORS, FALLBACK_COLOR};
pub use render::{save_png_atomic, Annotator, RenderOptions};
