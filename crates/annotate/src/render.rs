//! Annotated image rendering
//!
//! Draws detection overlays (box outlines, labels, scores, index markers,
//! co-reference links) onto an image and composes the final visualization
//! canvas with a title band and a category legend.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size, Blend,
};
use imageproc::rect::Rect;
use moldetect_common::{DetectError, DetectionResult, Result};
use tracing::debug;

use crate::font::resolve_font;
use crate::geometry::{to_pixel_box, PixelBox};
use crate::linker::{dash_strokes, plan_links, LinkSegment};
use crate::palette::{color_for, legend_entries};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LINK_LINE: Rgba<u8> = Rgba([0, 0, 0, 153]);
const LINK_BG: Rgba<u8> = Rgba([255, 255, 0, 204]);
const LINK_GLYPH: &str = "\u{2194}";

const TAG_PAD: u32 = 2;
const TEXT_GAP: i64 = 5;
const TITLE_PAD: u32 = 8;
const LEGEND_PAD: u32 = 10;
const SWATCH: u32 = 14;
const SWATCH_GAP: u32 = 6;
const LEGEND_ROW_H: u32 = 24;

/// Annotation rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Stroke width for box outlines
    pub line_thickness: u32,
    /// Font scale for category labels
    pub label_scale: f32,
    /// Font scale for score annotations
    pub score_scale: f32,
    /// Font scale for index and link markers
    pub marker_scale: f32,
    /// Font scale for the title band
    pub title_scale: f32,
    /// Font scale for legend rows
    pub legend_scale: f32,
    /// On-stroke length of dashed link lines
    pub link_dash_len: f32,
    /// Label background opacity (0-255)
    pub label_bg_alpha: u8,
}

impl Default for RenderOptions {
    #[inline]
    fn default() -> Self {
        Self {
            line_thickness: 2,
            label_scale: 16.0,
            score_scale: 14.0,
            marker_scale: 16.0,
            title_scale: 24.0,
            legend_scale: 16.0,
            link_dash_len: 6.0,
            label_bg_alpha: 204,
        }
    }
}

/// Renders detection results onto images
///
/// Holds the resolved font and rendering options; one instance is shared
/// across requests since rendering takes `&self` and owns no mutable state.
pub struct Annotator {
    font: FontVec,
    options: RenderOptions,
}

impl Annotator {
    /// Create an annotator with default options
    ///
    /// # Errors
    /// Fails when no usable font can be resolved.
    pub fn new(font_override: Option<&Path>) -> Result<Self> {
        Self::with_options(font_override, RenderOptions::default())
    }

    /// Create an annotator with explicit options
    ///
    /// # Errors
    /// Fails when no usable font can be resolved.
    pub fn with_options(font_override: Option<&Path>, options: RenderOptions) -> Result<Self> {
        let font = resolve_font(font_override)?;
        Ok(Self { font, options })
    }

    /// Draw detection overlays onto a copy of `image`
    ///
    /// Output has the input's dimensions. Boxes draw in list order, so later
    /// detections overpaint earlier ones; links draw after all boxes. The
    /// input is never mutated.
    ///
    /// # Errors
    /// `MalformedResult` when the result fails validation; nothing is drawn
    /// in that case.
    pub fn annotate(&self, image: &DynamicImage, result: &DetectionResult) -> Result<RgbaImage> {
        result.validate()?;
        let (width, height) = (image.width(), image.height());
        let links = plan_links(result, width, height)?;
        debug!(
            boxes = result.bboxes.len(),
            links = links.len(),
            "annotating image"
        );

        let mut canvas = Blend(image.to_rgba8());
        for (i, det) in result.bboxes.iter().enumerate() {
            let px = to_pixel_box(&det.bbox, width, height);
            let color = color_for(&det.category);
            self.draw_outline(&mut canvas, px, color);

            let label = format!("{} (ID:{})", det.category, det.category_id);
            let (_, label_h) = self.tag_size(&label, self.options.label_scale);
            let label_bg = Rgba([255, 255, 255, self.options.label_bg_alpha]);
            self.draw_tag(
                &mut canvas,
                i64::from(px.x1),
                i64::from(px.y1) - TEXT_GAP - label_h,
                &label,
                self.options.label_scale,
                color,
                label_bg,
            );

            let score = format!("Score: {}", det.score);
            self.draw_tag(
                &mut canvas,
                i64::from(px.x1),
                i64::from(px.y2) + TEXT_GAP,
                &score,
                self.options.score_scale,
                color,
                label_bg,
            );

            let marker = format!("#{i}");
            self.draw_tag(
                &mut canvas,
                i64::from(px.x1) + TEXT_GAP,
                i64::from(px.y1) + TEXT_GAP,
                &marker,
                self.options.marker_scale,
                WHITE,
                BLACK,
            );
        }

        for link in &links {
            self.draw_link(&mut canvas, link);
        }

        Ok(canvas.0)
    }

    /// Render the full visualization canvas
    ///
    /// Composes a title band above the annotated image and a legend panel
    /// on the right edge listing the categories present in `result`.
    ///
    /// # Errors
    /// Same failure modes as [`Annotator::annotate`].
    pub fn render(
        &self,
        image: &DynamicImage,
        result: &DetectionResult,
        display_name: &str,
    ) -> Result<RgbaImage> {
        let annotated = self.annotate(image, result)?;
        Ok(self.compose(&annotated, result, display_name))
    }

    /// Stroke thickness as nested 1 px rings, each inset by one pixel.
    /// Segment drawing works in f32 so far-out-of-range boxes clip instead
    /// of overflowing integer rect math.
    fn draw_outline(&self, canvas: &mut Blend<RgbaImage>, px: PixelBox, color: Rgba<u8>) {
        for t in 0..self.options.line_thickness {
            let inset = t as f32;
            let left = px.x1 as f32 + inset;
            let top = px.y1 as f32 + inset;
            let right = px.x2 as f32 - inset;
            let bottom = px.y2 as f32 - inset;
            if right < left || bottom < top {
                break;
            }
            draw_line_segment_mut(canvas, (left, top), (right, top), color);
            draw_line_segment_mut(canvas, (left, bottom), (right, bottom), color);
            draw_line_segment_mut(canvas, (left, top), (left, bottom), color);
            draw_line_segment_mut(canvas, (right, top), (right, bottom), color);
        }
    }

    fn draw_link(&self, canvas: &mut Blend<RgbaImage>, link: &LinkSegment) {
        for (a, b) in dash_strokes(link.start, link.end, self.options.link_dash_len) {
            draw_line_segment_mut(canvas, a, b, LINK_LINE);
        }
        let (mid_x, mid_y) = link.midpoint();
        let (glyph_w, glyph_h) = self.tag_size(LINK_GLYPH, self.options.marker_scale);
        self.draw_tag(
            canvas,
            mid_x as i64 - glyph_w / 2,
            mid_y as i64 - glyph_h / 2,
            LINK_GLYPH,
            self.options.marker_scale,
            BLACK,
            LINK_BG,
        );
    }

    fn tag_size(&self, text: &str, scale: f32) -> (i64, i64) {
        let (w, h) = text_size(PxScale::from(scale), &self.font, text);
        (
            i64::from(w + 2 * TAG_PAD),
            i64::from(h + 2 * TAG_PAD),
        )
    }

    /// Draw `text` on a filled background patch with `(x, y)` as the patch
    /// top-left corner. Patches entirely outside the canvas are skipped.
    fn draw_tag(
        &self,
        canvas: &mut Blend<RgbaImage>,
        x: i64,
        y: i64,
        text: &str,
        scale: f32,
        fg: Rgba<u8>,
        bg: Rgba<u8>,
    ) {
        let (bw, bh) = self.tag_size(text, scale);
        let (cw, ch) = canvas.0.dimensions();
        if x + bw <= 0 || y + bh <= 0 || x >= i64::from(cw) || y >= i64::from(ch) {
            return;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(bw as u32, bh as u32);
        draw_filled_rect_mut(canvas, rect, bg);
        draw_text_mut(
            canvas,
            fg,
            x as i32 + TAG_PAD as i32,
            y as i32 + TAG_PAD as i32,
            PxScale::from(scale),
            &self.font,
            text,
        );
    }

    fn compose(
        &self,
        annotated: &RgbaImage,
        result: &DetectionResult,
        display_name: &str,
    ) -> RgbaImage {
        let entries = legend_entries(&result.bboxes);
        let title = format!("Detection Results - {display_name}");
        let title_scale = PxScale::from(self.options.title_scale);
        let legend_scale = PxScale::from(self.options.legend_scale);

        let (title_w, title_h) = text_size(title_scale, &self.font, &title);
        let band_h = title_h + 2 * TITLE_PAD;

        let legend_w = if entries.is_empty() {
            0
        } else {
            let widest = entries
                .iter()
                .map(|(name, _)| text_size(legend_scale, &self.font, name).0)
                .max()
                .unwrap_or(0);
            2 * LEGEND_PAD + SWATCH + SWATCH_GAP + widest
        };
        let legend_h = if entries.is_empty() {
            0
        } else {
            2 * LEGEND_PAD + entries.len() as u32 * LEGEND_ROW_H
        };

        let out_w = annotated.width() + legend_w;
        let out_h = band_h + annotated.height().max(legend_h);
        let mut out = RgbaImage::from_pixel(out_w, out_h, WHITE);

        let title_x = (out_w.saturating_sub(title_w) / 2) as i32;
        draw_text_mut(
            &mut out,
            BLACK,
            title_x,
            TITLE_PAD as i32,
            title_scale,
            &self.font,
            &title,
        );

        image::imageops::replace(&mut out, annotated, 0, i64::from(band_h));

        let legend_x = (annotated.width() + LEGEND_PAD) as i32;
        let mut row_y = (band_h + LEGEND_PAD) as i32;
        for (name, color) in entries {
            let swatch = Rect::at(legend_x, row_y).of_size(SWATCH, SWATCH);
            draw_filled_rect_mut(&mut out, swatch, color);
            draw_text_mut(
                &mut out,
                BLACK,
                legend_x + (SWATCH + SWATCH_GAP) as i32,
                row_y - 2,
                legend_scale,
                &self.font,
                name,
            );
            row_y += LEGEND_ROW_H as i32;
        }

        out
    }
}

/// Write a rendered image to `path` without exposing partial files
///
/// The PNG is staged to a temporary file in the destination directory and
/// renamed into place once fully written.
///
/// # Errors
/// Surfaces staging, encoding, and rename failures as IO errors.
pub fn save_png_atomic(img: &RgbaImage, path: &Path) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let staged = tempfile::Builder::new()
        .prefix(".staged-")
        .suffix(".png")
        .tempfile_in(dir.unwrap_or_else(|| Path::new(".")))?;
    img.save_with_format(staged.path(), image::ImageFormat::Png)
        .map_err(|err| match err {
            image::ImageError::IoError(io) => DetectError::Io(io),
            other => DetectError::Io(std::io::Error::new(std::io::ErrorKind::Other, other)),
        })?;
    staged.persist(path).map_err(|err| DetectError::Io(err.error))?;
    Ok(())
}
