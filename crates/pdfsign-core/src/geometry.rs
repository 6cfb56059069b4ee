//! Pixel-space boxes and the pixel → point coordinate transform.
//!
//! Two coordinate systems meet here:
//! - raster pixels produced for OCR: origin top-left, y grows downward;
//! - PDF user space in points: origin bottom-left, y grows upward.

use crate::error::SignError;

/// Bounding box in raster pixel space (top-left origin).
///
/// - `x0`: left edge
/// - `top`: top edge (distance from top of image)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of image)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Build a box from an OCR-style `(left, top, width, height)` tuple.
    pub fn from_xywh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// The box as `(x, y, width, height)`.
    pub fn to_xywh(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.top, self.width(), self.height())
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scale-and-flip transform between a rasterized page image and its PDF page.
///
/// Construction fails for zero-sized images: a raster without pixels means
/// the renderer failed upstream, and the scale factors would be undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelToPoint {
    page_height: f64,
    sx: f64,
    sy: f64,
}

impl PixelToPoint {
    /// Create the transform for a page of `page` points rendered to an
    /// image of `image_width` × `image_height` pixels.
    pub fn new(page: PageSize, image_width: u32, image_height: u32) -> Result<Self, SignError> {
        if image_width == 0 || image_height == 0 {
            return Err(SignError::InvalidRaster {
                width: image_width,
                height: image_height,
            });
        }
        Ok(Self {
            page_height: page.height,
            sx: page.width / f64::from(image_width),
            sy: page.height / f64::from(image_height),
        })
    }

    /// Horizontal scale (points per pixel).
    pub fn sx(&self) -> f64 {
        self.sx
    }

    /// Vertical scale (points per pixel).
    pub fn sy(&self) -> f64 {
        self.sy
    }

    /// Map a pixel coordinate to a PDF point coordinate.
    pub fn to_point(&self, x_px: f64, y_px: f64) -> (f64, f64) {
        (x_px * self.sx, self.page_height - y_px * self.sy)
    }

    /// Map a PDF point coordinate back to pixels.
    pub fn to_pixel(&self, x_pt: f64, y_pt: f64) -> (f64, f64) {
        (x_pt / self.sx, (self.page_height - y_pt) / self.sy)
    }
}

/// Convert a pixel point (origin top-left) to a PDF point (origin bottom-left).
///
/// Returns [`SignError::InvalidRaster`] when either image dimension is zero.
pub fn pixel_to_point(
    x_px: f64,
    y_px: f64,
    page: PageSize,
    image_width: u32,
    image_height: u32,
) -> Result<(f64, f64), SignError> {
    Ok(PixelToPoint::new(page, image_width, image_height)?.to_point(x_px, y_px))
}
