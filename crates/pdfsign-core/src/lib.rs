//! pdfsign-core: backend-independent data types and algorithms.
//!
//! This crate provides the OCR word/line model and anchor matching, the
//! pixel → point transform, greedy word-wrap and overlay placement, and the
//! error/warning types shared by the pdfsign crates. It has no PDF or
//! imaging dependencies.

pub mod anchor;
pub mod config;
pub mod encoding;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod ocr;

pub use anchor::{ANCHOR_DEFAULT, AnchorHit, DEFAULT_DPI};
pub use config::{
    DEFAULT_FONT_PATH, DEFAULT_OCR_LANGUAGE, DEFAULT_PDFTOPPM, SignerConfig,
    default_tesseract_binary,
};
pub use encoding::{WinAnsiText, win_ansi_decode, win_ansi_encode, win_ansi_encode_char};
pub use error::{Reported, SignError, SignWarning, SignWarningCode};
pub use geometry::{BBox, PageSize, PixelToPoint, pixel_to_point};
pub use layout::{
    FALLBACK_SIGNATURE_ASPECT, LayoutConfig, OverlayPlan, SignaturePlacement, TextMeasure,
    plan_overlay, signature_aspect, wrap_words,
};
pub use ocr::{LineKey, LineMatch, OcrLine, OcrWord, find_anchor_line, group_lines, normalize};
