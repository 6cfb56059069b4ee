//! The located anchor line.

use crate::geometry::BBox;

/// Anchor phrase searched for when the caller supplies none.
pub const ANCHOR_DEFAULT: &str = "Stanovisko odborného útvaru";

/// Rasterization resolution used when the caller supplies none.
pub const DEFAULT_DPI: u32 = 300;

/// Where the anchor phrase was found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorHit {
    /// Zero-based page index in document order.
    pub page_index: usize,
    /// Union of the matched line's word boxes, in raster pixels.
    pub bbox_px: BBox,
    /// Rasterized page size `(width, height)` in pixels.
    pub image_size_px: (u32, u32),
    /// Resolution the page was rasterized at.
    pub dpi: u32,
    /// Recognised text of the matched line.
    pub line_text: String,
}

impl AnchorHit {
    /// The matched line box as `(x, y, width, height)`.
    pub fn bbox_xywh(&self) -> (f64, f64, f64, f64) {
        self.bbox_px.to_xywh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_xywh_reports_origin_and_extent() {
        let hit = AnchorHit {
            page_index: 0,
            bbox_px: BBox::new(120.0, 300.0, 820.0, 360.0),
            image_size_px: (2480, 3508),
            dpi: DEFAULT_DPI,
            line_text: ANCHOR_DEFAULT.to_string(),
        };
        assert_eq!(hit.bbox_xywh(), (120.0, 300.0, 700.0, 60.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_to_json() {
        let hit = AnchorHit {
            page_index: 2,
            bbox_px: BBox::new(1.0, 2.0, 3.0, 4.0),
            image_size_px: (10, 20),
            dpi: 150,
            line_text: "x".to_string(),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["page_index"], 2);
        assert_eq!(json["image_size_px"][1], 20);
        assert_eq!(json["bbox_px"]["x1"], 3.0);
    }
}
