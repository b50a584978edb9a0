//! Normalized-to-pixel coordinate mapping

use moldetect_common::BoundingBox;

/// Bounding box resolved to pixel coordinates
///
/// Coordinates may lie outside the canvas when the normalized input was out
/// of range; drawing clips them at the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelBox {
    /// Box width in pixels (negative only for malformed input)
    #[must_use]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Box height in pixels (negative only for malformed input)
    #[must_use]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Center point, as drawing coordinates
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x1 as f32 + self.x2 as f32) / 2.0,
            (self.y1 as f32 + self.y2 as f32) / 2.0,
        )
    }
}

/// Scale a normalized bounding box to pixel coordinates
///
/// Each coordinate is `round(coord * dimension)` (x by width, y by height).
/// No clamping: values outside 0-1 map outside the canvas.
#[must_use]
pub fn to_pixel_box(bbox: &BoundingBox, width: u32, height: u32) -> PixelBox {
    PixelBox {
        x1: (bbox.x1 * f64::from(width)).round() as i32,
        y1: (bbox.y1 * f64::from(height)).round() as i32,
        x2: (bbox.x2 * f64::from(width)).round() as i32,
        y2: (bbox.y2 * f64::from(height)).round() as i32,
    }
}
