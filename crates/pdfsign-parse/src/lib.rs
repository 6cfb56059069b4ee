//! pdfsign-parse: lopdf backend and external-tool adapters for pdfsign.
//!
//! This crate holds everything that touches bytes or processes: opening PDFs
//! (via lopdf), writing the single-page overlay document, stamping it onto a
//! target page, embedding fonts and signature images, and driving the
//! `pdftoppm` rasterizer and the `tesseract` OCR engine.
//! It depends on pdfsign-core for shared data types and layout.

pub mod error;
pub mod fonts;
pub mod lopdf_backend;
pub mod merge;
pub mod overlay;
pub mod raster;
pub mod standard_fonts;
pub mod tesseract;

pub use error::BackendError;
pub use fonts::{EncodedText, FontRegistry};
pub use lopdf_backend::PdfDocument;
pub use merge::{OVERLAY_RESOURCE, merge_overlay, stamp_overlay, write_atomically};
pub use overlay::{SignatureImage, png_dimensions, render_overlay};
pub use pdfsign_core;
pub use raster::{PdftoppmRasterizer, RasterPage, Rasterizer};
pub use tesseract::{OcrEngine, TesseractCli, parse_tsv};
