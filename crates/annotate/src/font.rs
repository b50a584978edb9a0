//! Font discovery for label rendering

use std::path::Path;

use ab_glyph::FontVec;
use moldetect_common::{DetectError, Result};
use tracing::debug;

/// Font files probed when no explicit path is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load the annotation font
///
/// With an override path the file must exist and parse; IO failures surface
/// as-is and parse failures as `FontUnavailable`. Without one, well-known
/// system locations are probed in order.
///
/// # Errors
/// Returns `FontUnavailable` when no candidate yields a parseable font.
pub fn resolve_font(override_path: Option<&Path>) -> Result<FontVec> {
    if let Some(path) = override_path {
        let data = std::fs::read(path)?;
        return FontVec::try_from_vec(data).map_err(|_| DetectError::FontUnavailable);
    }

    for candidate in FONT_CANDIDATES {
        if let Ok(data) = std::fs::read(candidate) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                debug!(path = candidate, "loaded annotation font");
                return Ok(font);
            }
        }
    }

    Err(DetectError::FontUnavailable)
}
