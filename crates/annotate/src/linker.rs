//! Co-reference link planning
//!
//! Turns the co-reference groups of a detection result into drawable line
//! segments. Only the first and last member of a group are connected; a group
//! shorter than two contributes nothing. Planning is pure so it can run
//! before any pixel is touched.

use moldetect_common::{DetectError, DetectionResult, Result};

use crate::geometry::to_pixel_box;

/// One planned link between two co-referring detections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSegment {
    /// Center of the group's first detection
    pub start: (f32, f32),
    /// Center of the group's last detection
    pub end: (f32, f32),
}

impl LinkSegment {
    /// Midpoint of the segment, where the link glyph goes
    #[must_use]
    pub fn midpoint(&self) -> (f32, f32) {
        (
            (self.start.0 + self.end.0) / 2.0,
            (self.start.1 + self.end.1) / 2.0,
        )
    }
}

/// Plan link segments for every group with at least two members
///
/// Groups are processed in input order, without sorting or deduplication.
///
/// # Errors
/// Returns `MalformedResult` when a group references an index outside
/// `result.bboxes`.
pub fn plan_links(result: &DetectionResult, width: u32, height: u32) -> Result<Vec<LinkSegment>> {
    let mut segments = Vec::new();
    for (g, group) in result.corefs.iter().enumerate() {
        if group.len() < 2 {
            continue;
        }
        let first = group[0];
        let last = group[group.len() - 1];
        let start = resolve_center(result, g, first, width, height)?;
        let end = resolve_center(result, g, last, width, height)?;
        segments.push(LinkSegment { start, end });
    }
    Ok(segments)
}

fn resolve_center(
    result: &DetectionResult,
    group: usize,
    idx: usize,
    width: u32,
    height: u32,
) -> Result<(f32, f32)> {
    let det = result.bboxes.get(idx).ok_or_else(|| {
        DetectError::MalformedResult(format!(
            "coref group {} references detection {} but only {} exist",
            group,
            idx,
            result.bboxes.len()
        ))
    })?;
    Ok(to_pixel_box(&det.bbox, width, height).center())
}

/// Split a segment into the on-strokes of a dashed line
///
/// Strokes of `dash_len` alternate with equal gaps, starting on. A
/// zero-length segment yields no strokes.
#[must_use]
pub fn dash_strokes(
    start: (f32, f32),
    end: (f32, f32),
    dash_len: f32,
) -> Vec<((f32, f32), (f32, f32))> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON || dash_len <= 0.0 {
        return Vec::new();
    }
    let ux = dx / len;
    let uy = dy / len;

    let mut strokes = Vec::new();
    let mut t = 0.0;
    while t < len {
        let t_end = (t + dash_len).min(len);
        strokes.push((
            (start.0 + ux * t, start.1 + uy * t),
            (start.0 + ux * t_end, start.1 + uy * t_end),
        ));
        t += dash_len * 2.0;
    }
    strokes
}
