//! Category color table
//!
//! One immutable table maps each category label to its display color. The
//! table's declared order is also the legend order.

use image::Rgba;
use moldetect_common::Detection;

/// Display colors per category label (RGBA), in legend order
pub const CATEGORY_COLORS: &[(&str, Rgba<u8>)] = &[
    ("[Mol]", Rgba([255, 0, 0, 255])),     // molecule - red
    ("[Idt]", Rgba([0, 0, 255, 255])),     // identifier - blue
    ("[Rct]", Rgba([0, 128, 0, 255])),     // reactant - green
    ("[Pdt]", Rgba([255, 165, 0, 255])),   // product - orange
    ("[Cat]", Rgba([128, 0, 128, 255])),   // catalyst - purple
    ("[Sol]", Rgba([165, 42, 42, 255])),   // solvent - brown
    ("[Tmp]", Rgba([255, 192, 203, 255])), // temperature - pink
    ("[Tme]", Rgba([0, 255, 255, 255])),   // time - cyan
];

/// Fallback color for labels outside the table (gray)
pub const FALLBACK_COLOR: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Look up the display color for a category label
///
/// Total over arbitrary strings: unmapped labels get `FALLBACK_COLOR`.
#[must_use]
pub fn color_for(category: &str) -> Rgba<u8> {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(FALLBACK_COLOR, |(_, color)| *color)
}

/// Legend rows for a set of detections
///
/// Walks the color table in declared order and keeps each category that
/// occurs at least once, so the legend never repeats a label and never lists
/// a category with zero occurrences. Labels outside the table are not listed.
#[must_use]
pub fn legend_entries(detections: &[Detection]) -> Vec<(&'static str, Rgba<u8>)> {
    CATEGORY_COLORS
        .iter()
        .filter(|(name, _)| detections.iter().any(|d| d.category == *name))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moldetect_common::BoundingBox;

    fn detection(category: &str) -> Detection {
        Detection {
            category: category.to_string(),
            category_id: 0,
            bbox: BoundingBox::new(0.1, 0.1, 0.2, 0.2),
            score: 0.9,
        }
    }

    #[test]
    fn test_color_for_known_categories() {
        assert_eq!(color_for("[Mol]"), Rgba([255, 0, 0, 255]));
        assert_eq!(color_for("[Idt]"), Rgba([0, 0, 255, 255]));
        assert_eq!(color_for("[Tme]"), Rgba([0, 255, 255, 255]));
    }

    #[test]
    fn test_color_for_is_total() {
        assert_eq!(color_for("[Unknown]"), FALLBACK_COLOR);
        assert_eq!(color_for(""), FALLBACK_COLOR);
        assert_eq!(color_for("mol"), FALLBACK_COLOR); // case-sensitive exact match
    }

    #[test]
    fn test_table_colors_are_distinct() {
        for i in 0..CATEGORY_COLORS.len() {
            for j in (i + 1)..CATEGORY_COLORS.len() {
                assert_ne!(
                    CATEGORY_COLORS[i].1, CATEGORY_COLORS[j].1,
                    "categories {} and {} share a color",
                    CATEGORY_COLORS[i].0, CATEGORY_COLORS[j].0
                );
            }
        }
    }

    #[test]
    fn test_legend_keeps_table_order_and_dedupes() {
        let detections = vec![
            detection("[Tme]"),
            detection("[Mol]"),
            detection("[Mol]"),
            detection("[Rct]"),
        ];
        let legend = legend_entries(&detections);
        let names: Vec<_> = legend.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["[Mol]", "[Rct]", "[Tme]"]);
    }

    #[test]
    fn test_legend_omits_absent_and_unknown_categories() {
        let detections = vec![detection("[Mol]"), detection("[Weird]")];
        let legend = legend_entries(&detections);
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].0, "[Mol]");
    }

    #[test]
    fn test_legend_empty_for_no_detections() {
        assert!(legend_entries(&[]).is_empty());
    }
}
