//! Word-wrap and overlay placement.
//!
//! Everything here works in PDF points. The anchor box arrives in raster
//! pixels and is mapped through [`PixelToPoint`] once; from then on text
//! lines flow downward from just below the anchor, and the signature sits
//! after the last glyph of the last line.

use crate::error::SignError;
use crate::geometry::{BBox, PageSize, PixelToPoint};

/// Aspect ratio assumed when a signature image exists but its header
/// cannot be read.
pub const FALLBACK_SIGNATURE_ASPECT: f64 = 3.0;

/// Fraction of the page width used for text when no width is configured.
pub const DEFAULT_TEXT_WIDTH_RATIO: f64 = 0.45;

/// Width metric of the active font.
pub trait TextMeasure {
    /// Advance width of `text` in points at `font_size`.
    fn string_width(&self, text: &str, font_size: f64) -> f64;
}

/// Layout parameters for the overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Maximum text width in points. `None` derives it from the page width.
    pub text_width_pt: Option<f64>,
    /// Distance between consecutive baselines.
    pub line_spacing_pt: f64,
    /// Font size for the inserted text.
    pub font_size_pt: f64,
    /// Gap between the anchor's bottom edge and the first baseline.
    pub below_offset_pt: f64,
    /// Rendered signature height.
    pub signature_height_pt: f64,
    /// Horizontal gap between the last glyph and the signature.
    pub signature_gap_pt: f64,
    /// Vertical nudge applied to the signature (positive moves it up).
    pub signature_baseline_offset_pt: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            text_width_pt: None,
            line_spacing_pt: 14.0,
            font_size_pt: 12.0,
            below_offset_pt: 22.0,
            signature_height_pt: 36.0,
            signature_gap_pt: 40.0,
            signature_baseline_offset_pt: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Effective maximum text width for a page.
    pub fn text_width_for(&self, page: PageSize) -> f64 {
        self.text_width_pt
            .unwrap_or(page.width * DEFAULT_TEXT_WIDTH_RATIO)
    }
}

/// Signature rectangle in page points (origin bottom-left of the image).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignaturePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Computed overlay geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayPlan {
    /// Left edge of every text line.
    pub start_x: f64,
    /// Baseline of each line, top to bottom.
    pub baselines: Vec<f64>,
    /// Wrapped lines.
    pub lines: Vec<String>,
    /// Width of the final line (0 when there are no lines).
    pub last_line_width: f64,
    /// Font size the lines are drawn at.
    pub font_size: f64,
    /// Signature placement, if a signature is drawn.
    pub signature: Option<SignaturePlacement>,
}

impl OverlayPlan {
    /// Baseline of the final line, or `None` when no text is drawn.
    pub fn last_baseline(&self) -> Option<f64> {
        self.baselines.last().copied()
    }

    /// Lines paired with their baselines.
    pub fn positioned_lines(&self) -> impl Iterator<Item = (&str, f64)> {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(self.baselines.iter().copied())
    }
}

/// Signature aspect ratio (width / height) from decoded image dimensions.
///
/// `None` means the header could not be read.
pub fn signature_aspect(dimensions: Option<(u32, u32)>) -> f64 {
    match dimensions {
        Some((_, 0)) => 1.0,
        Some((w, h)) => f64::from(w) / f64::from(h),
        None => FALLBACK_SIGNATURE_ASPECT,
    }
}

/// Greedy word-wrap on whitespace.
///
/// A word is appended to the current line while the joined line fits
/// `max_width`. A single word wider than `max_width` is placed alone on its
/// own line, never truncated or split.
pub fn wrap_words(
    text: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        let candidate = current.join(" ");
        if measure.string_width(&candidate, font_size) > max_width {
            current.pop();
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Plan text and signature placement below an anchor.
///
/// `signature_aspect` is `Some` only when a signature image will be drawn.
pub fn plan_overlay(
    page: PageSize,
    anchor_bbox_px: &BBox,
    image_size_px: (u32, u32),
    text: &str,
    signature_aspect: Option<f64>,
    layout: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> Result<OverlayPlan, SignError> {
    let mapper = PixelToPoint::new(page, image_size_px.0, image_size_px.1)?;
    let (start_x, anchor_bottom) = mapper.to_point(anchor_bbox_px.x0, anchor_bbox_px.bottom);
    let first_baseline = anchor_bottom - layout.below_offset_pt;

    let lines = wrap_words(
        text,
        layout.text_width_for(page),
        layout.font_size_pt,
        measure,
    );
    let baselines: Vec<f64> = (0..lines.len())
        .map(|i| first_baseline - i as f64 * layout.line_spacing_pt)
        .collect();

    let last_line_width = lines
        .last()
        .map(|l| measure.string_width(l, layout.font_size_pt))
        .unwrap_or(0.0);
    let last_baseline = baselines.last().copied().unwrap_or(first_baseline);

    let signature = signature_aspect.map(|aspect| {
        let height = layout.signature_height_pt;
        SignaturePlacement {
            x: start_x + last_line_width + layout.signature_gap_pt,
            y: last_baseline - (height - layout.font_size_pt)
                + layout.signature_baseline_offset_pt,
            width: height * aspect,
            height,
        }
    });

    Ok(OverlayPlan {
        start_x,
        baselines,
        lines,
        last_line_width,
        font_size: layout.font_size_pt,
        signature,
    })
}
